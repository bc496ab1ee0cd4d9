use biometrics::{Collector, Counter, Moments};

pub(crate) static CONVERSATIONS_LOADED: Counter = Counter::new("colloquy.conversations.loaded");
pub(crate) static CONVERSATIONS_DELETED: Counter = Counter::new("colloquy.conversations.deleted");
pub(crate) static CONVERSATIONS_RENAMED: Counter = Counter::new("colloquy.conversations.renamed");

pub(crate) static MESSAGES_SENT: Counter = Counter::new("colloquy.messages.sent");
pub(crate) static MESSAGES_REGENERATED: Counter = Counter::new("colloquy.messages.regenerated");
pub(crate) static TITLES_GENERATED: Counter = Counter::new("colloquy.titles.generated");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("colloquy.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("colloquy.stream.errors");
pub(crate) static STREAM_DURATION: Moments = Moments::new("colloquy.stream.duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CONVERSATIONS_LOADED);
    collector.register_counter(&CONVERSATIONS_DELETED);
    collector.register_counter(&CONVERSATIONS_RENAMED);

    collector.register_counter(&MESSAGES_SENT);
    collector.register_counter(&MESSAGES_REGENERATED);
    collector.register_counter(&TITLES_GENERATED);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_moments(&STREAM_DURATION);
}
