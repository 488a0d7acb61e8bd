use bevy::prelude::*;
use df_stream::{ChunkStreamer, ConfigError, ReconcileReport, TickOutcome};

use crate::content::{CommandsInstantiator, ContentConfig, StreamedContent};
use crate::StreamingObserver;

/// Systems that load and unload streamed content. Order observer movement
/// before this set to stream from the current frame's position.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkStreamingSet;

/// Registry of materialized chunks for content `C`.
#[derive(Resource)]
pub struct ContentStream<C: StreamedContent> {
    pub streamer: ChunkStreamer<C::Variant, C::Ranges, Entity>,
    /// Result of the most recent chunk transition.
    pub last_report: Option<ReconcileReport>,
    /// Placements that failed to spawn since startup.
    pub failed_total: usize,
}

impl<C: StreamedContent> ContentStream<C> {
    pub fn new(streamer: ChunkStreamer<C::Variant, C::Ranges, Entity>) -> Self {
        Self {
            streamer,
            last_report: None,
            failed_total: 0,
        }
    }
}

/// Streams content `C` around the [`StreamingObserver`].
pub struct ContentStreamPlugin<C: StreamedContent> {
    config: ContentConfig<C>,
}

impl<C: StreamedContent> ContentStreamPlugin<C> {
    /// Validate `config` up front so a bad setup is reported before the app runs.
    pub fn new(config: ContentConfig<C>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl<C: StreamedContent> Plugin for ContentStreamPlugin<C> {
    fn build(&self, app: &mut App) {
        let streamer = match ChunkStreamer::new(self.config.clone()) {
            Ok(streamer) => streamer,
            Err(err) => {
                error!("{} streaming disabled: {}", C::NAME, err);
                return;
            }
        };

        app.insert_resource(ContentStream::<C>::new(streamer))
            .add_systems(Update, stream_content::<C>.in_set(ChunkStreamingSet));
    }
}

/// Once per frame: hand the observer position to the streamer.
pub fn stream_content<C: StreamedContent>(
    mut commands: Commands,
    mut stream: ResMut<ContentStream<C>>,
    observers: Query<&Transform, With<StreamingObserver>>,
) {
    let observer = observers.iter().next().map(|t| t.translation.truncate());
    let stream = &mut *stream;
    let mut instantiator = CommandsInstantiator::<C>::new(&mut commands);

    if let TickOutcome::Reconciled(report) = stream.streamer.tick(observer, &mut instantiator) {
        if report.failed > 0 {
            warn!(
                "{}: {} placements failed to spawn entering chunk {}",
                C::NAME,
                report.failed,
                report.observer_chunk
            );
        }
        stream.failed_total += report.failed;
        stream.last_report = Some(report);
    }
}
