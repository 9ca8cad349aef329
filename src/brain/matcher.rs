//! Trigger matching: exact message first, then first substring containment

use rand::seq::IndexedRandom;
use rand::Rng;

use super::types::Trigger;

/// Locate the trigger that answers `input`.
///
/// An exact match always wins. Otherwise the first trigger, in stored order,
/// whose message occurs inside `input` is returned.
pub fn find_trigger<'a>(input: &str, triggers: &'a [Trigger]) -> Option<&'a Trigger> {
    triggers
        .iter()
        .find(|t| t.message == input)
        .or_else(|| triggers.iter().find(|t| input.contains(t.message.as_str())))
}

/// Pick one of the trigger's replies uniformly at random
pub fn pick_reply<R: Rng + ?Sized>(trigger: &Trigger, rng: &mut R) -> Option<String> {
    trigger.replies.choose(rng).cloned()
}

/// Find a reply for `input`, or `None` when nothing was taught for it
pub fn match_reply<R: Rng + ?Sized>(
    input: &str,
    triggers: &[Trigger],
    rng: &mut R,
) -> Option<String> {
    find_trigger(input, triggers).and_then(|t| pick_reply(t, rng))
}
