/// Shared-secret gate in front of directory export, import and clear.
///
/// Plain string equality against a configured key. It keeps casual users away from
/// destructive actions and is not an authentication mechanism.
#[derive(Debug, Clone)]
pub struct SettingsGate {
    key: String,
    unlocked: bool,
}

impl SettingsGate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            unlocked: false,
        }
    }

    /// Whether `input` matches the key. A match unlocks for the rest of the session;
    /// a later mismatch reports `false` without locking again.
    pub fn unlock(&mut self, input: &str) -> bool {
        let matched = input == self.key;
        if matched {
            self.unlocked = true;
        }
        matched
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exact_key_unlocks() {
        let mut gate = SettingsGate::new("Fabric2038");
        assert!(!gate.unlock("fabric2038"));
        assert!(!gate.unlock("Fabric2038 "));
        assert!(gate.unlock("Fabric2038"));
        assert!(gate.is_unlocked());
    }

    #[test]
    fn wrong_key_after_unlock_is_still_rejected() {
        let mut gate = SettingsGate::new("Fabric2038");
        assert!(gate.unlock("Fabric2038"));

        assert!(!gate.unlock("guess"));
        assert!(gate.is_unlocked());
    }
}
