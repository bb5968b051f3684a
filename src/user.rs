//! Chat user tracking.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Badge names that imply moderator privileges.
/// See <https://dev.twitch.tv/docs/irc/tags/#userstate-twitch-tags>.
const MOD_BADGES: [&str; 3] = ["broadcaster", "moderator", "admin"];

/// Errors from applying a user MODE delta.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModeChangeError {
    /// The delta was not of the strict `+X`/`-X` two-character form.
    #[error("malformed mode delta: {0:?}")]
    Malformed(String),

    /// `+X` for a mode the user already has.
    #[error("mode '{0}' already set")]
    AlreadySet(char),

    /// `-X` for a mode the user does not have.
    #[error("mode '{0}' not set")]
    NotSet(char),
}

/// State tracked for a single chat user.
#[derive(Debug, Clone, Default)]
pub struct User {
    /// The user's nickname.
    pub name: String,
    mode: HashSet<char>,
    tags: HashMap<String, String>,
}

impl User {
    /// Create a user with no modes and no tags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: HashSet::new(),
            tags: HashMap::new(),
        }
    }

    /// Apply a strict `+X`/`-X` single-character mode delta.
    ///
    /// Any other form is rejected; on rejection nothing is mutated.
    pub fn apply_mode_delta(&mut self, delta: &str) -> Result<(), ModeChangeError> {
        let mut chars = delta.chars();
        let (sign, mode) = match (chars.next(), chars.next(), chars.next()) {
            (Some(sign @ ('+' | '-')), Some(mode), None) => (sign, mode),
            _ => return Err(ModeChangeError::Malformed(delta.to_owned())),
        };

        if sign == '+' {
            if !self.mode.insert(mode) {
                return Err(ModeChangeError::AlreadySet(mode));
            }
        } else if !self.mode.remove(&mode) {
            return Err(ModeChangeError::NotSet(mode));
        }
        Ok(())
    }

    /// Whether the given mode character is set.
    pub fn has_mode(&self, mode: char) -> bool {
        self.mode.contains(&mode)
    }

    /// Overwrite-merge message tags into the user's cached tags.
    pub fn merge_tags(&mut self, tags: &HashMap<String, String>) {
        self.tags
            .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Look up a cached tag value.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Moderator status: channel operator mode, the `mod` tag, or a
    /// broadcaster/moderator/admin badge.
    pub fn is_moderator(&self) -> bool {
        self.has_mode('o')
            || self.tag("mod") == Some("1")
            || self
                .tag("badges")
                .unwrap_or("")
                .split(',')
                .any(|badge| MOD_BADGES.contains(&badge.split('/').next().unwrap_or("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mode_delta_set_and_unset() {
        let mut user = User::new("alice");
        user.apply_mode_delta("+o").unwrap();
        assert!(user.has_mode('o'));
        user.apply_mode_delta("-o").unwrap();
        assert!(!user.has_mode('o'));
    }

    #[test]
    fn duplicate_set_is_rejected_without_mutation() {
        let mut user = User::new("alice");
        user.apply_mode_delta("+o").unwrap();
        assert_eq!(
            user.apply_mode_delta("+o"),
            Err(ModeChangeError::AlreadySet('o'))
        );
        // Still exactly {o}.
        assert!(user.has_mode('o'));
        user.apply_mode_delta("-o").unwrap();
        assert!(!user.has_mode('o'));
    }

    #[test]
    fn unset_of_missing_mode_is_rejected() {
        let mut user = User::new("alice");
        assert_eq!(
            user.apply_mode_delta("-v"),
            Err(ModeChangeError::NotSet('v'))
        );
    }

    #[test]
    fn malformed_deltas_are_rejected() {
        let mut user = User::new("alice");
        for delta in ["", "o", "+", "+ov", "o+", "*o"] {
            assert!(matches!(
                user.apply_mode_delta(delta),
                Err(ModeChangeError::Malformed(_))
            ));
        }
        assert!(!user.has_mode('o'));
    }

    #[test]
    fn moderator_via_mode() {
        let mut user = User::new("alice");
        assert!(!user.is_moderator());
        user.apply_mode_delta("+o").unwrap();
        assert!(user.is_moderator());
    }

    #[test]
    fn moderator_via_mod_tag() {
        let mut user = User::new("alice");
        user.merge_tags(&tags(&[("mod", "1")]));
        assert!(user.is_moderator());
    }

    #[test]
    fn moderator_via_badges() {
        let mut user = User::new("alice");
        user.merge_tags(&tags(&[("badges", "subscriber/12,broadcaster/1")]));
        assert!(user.is_moderator());

        let mut pleb = User::new("bob");
        pleb.merge_tags(&tags(&[("badges", "subscriber/12,bits/100")]));
        assert!(!pleb.is_moderator());
    }

    #[test]
    fn merge_tags_overwrites() {
        let mut user = User::new("alice");
        user.merge_tags(&tags(&[("color", "red"), ("mod", "0")]));
        user.merge_tags(&tags(&[("color", "blue")]));
        assert_eq!(user.tag("color"), Some("blue"));
        assert_eq!(user.tag("mod"), Some("0"));
    }
}
