//! Output classification
//!
//! The cf CLI signals plenty of handleable conditions only through its
//! human-readable output, so every operation funnels its captured text
//! through one ordered rule table. The wording the tables match on is
//! coupled to the CLI's messages; when the CLI changes phrasing, this
//! module is the only place to touch.

/// Outcome of classifying one execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation succeeded, possibly as an idempotent no-op.
    Success,
    /// Transient condition; the operation may be retried.
    Retry,
    /// Permanent failure.
    Fatal,
}

/// One substring rule. Patterns are matched case-insensitively and must be
/// stored lowercase.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Lowercase substring to look for in the captured output
    pub pattern: &'static str,
    /// Outcome when the pattern matches
    pub outcome: Outcome,
}

const fn rule(pattern: &'static str, outcome: Outcome) -> Rule {
    Rule { pattern, outcome }
}

/// Classify one execution result.
///
/// Exit code zero is always a success, whatever the output says. On a
/// non-zero exit the first matching rule wins; no match means fatal.
/// Pure function: identical inputs always classify identically.
pub fn classify(exit_code: Option<i32>, text: &str, rules: &[Rule]) -> Outcome {
    if exit_code == Some(0) {
        return Outcome::Success;
    }
    let lowered = text.to_lowercase();
    for rule in rules {
        if lowered.contains(rule.pattern) {
            return rule.outcome;
        }
    }
    Outcome::Fatal
}

/// Per-operation rule tables.
pub mod rules {
    use super::{rule, Outcome, Rule};

    /// No special cases: zero exit or fatal.
    pub const GENERIC: &[Rule] = &[];

    /// Known credential-rejection wordings. All fatal; the table exists so
    /// the façade can tell an auth rejection from CLI plumbing failures.
    pub const AUTH: &[Rule] = &[
        rule("credentials were rejected", Outcome::Fatal),
        rule("invalid credentials", Outcome::Fatal),
        rule("not logged in", Outcome::Fatal),
        rule("unable to authenticate", Outcome::Fatal),
    ];

    /// Idempotent create semantics for services, orgs and spaces.
    pub const CREATE: &[Rule] = &[rule("already exists", Outcome::Success)];

    /// Binding an already-bound service is a no-op.
    pub const BIND: &[Rule] = &[rule("already bound", Outcome::Success)];

    /// Transient infrastructure conditions seen during staging and start.
    pub const PUSH: &[Rule] = &[
        rule("staging time expired", Outcome::Retry),
        rule("timed out", Outcome::Retry),
        rule("timeout", Outcome::Retry),
        rule("bad gateway", Outcome::Retry),
        rule("server error", Outcome::Retry),
    ];
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
