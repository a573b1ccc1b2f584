/// Messaging module
///
/// The controller publishes [`AudioEvent`]s on an [`EventBus`]; anything
/// interested in stream lifecycles (UI, analytics, game logic waiting for
/// a clip to end) subscribes and drains its receiver at its own pace.
///
/// ```rust,ignore
/// let (rx, _id) = controller.events().subscribe();
///
/// controller.tick(frame_time);
///
/// while let Ok(event) = rx.try_recv() {
///     if let AudioEvent::StreamEnded { stream } = event {
///         // clip finished on its own
///     }
/// }
/// ```

pub mod bus;
pub mod events;

pub use bus::{EventBus, SubscriberId};
pub use events::AudioEvent;
