use crate::guards::{CandyGuardConfig, GuardGroup};
use crate::structured_logging::MintLogger;
use crate::types::DEFAULT_GROUP_LABEL;

/// Pick the guard group a mint runs against.
///
/// A group whose label matches `requested_label` wins. Otherwise the
/// candy guard's top-level guards are used under the label `default`. With
/// no configuration at all the result is `default` with no guards, and an
/// error is logged since no mint is possible.
pub fn select_guard(
    requested_label: &str,
    config: Option<&CandyGuardConfig>,
    logger: &MintLogger,
) -> GuardGroup {
    let Some(config) = config else {
        logger.log_missing_guard_config(requested_label);
        return GuardGroup::unconfigured();
    };

    if let Some(group) = config.group(requested_label) {
        logger.log_guard_selected(&group.label, false);
        return GuardGroup::new(group.label.clone(), group.guards.clone());
    }

    logger.log_guard_selected(DEFAULT_GROUP_LABEL, requested_label != DEFAULT_GROUP_LABEL);
    GuardGroup::new(DEFAULT_GROUP_LABEL, config.default.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::{Group, GuardKind, GuardSet, MintLimit, SolPayment};
    use solana_sdk::pubkey::Pubkey;

    fn config_with_wl_group() -> CandyGuardConfig {
        CandyGuardConfig {
            address: Pubkey::new_unique(),
            default: GuardSet {
                sol_payment: Some(SolPayment {
                    lamports: 500_000_000,
                    destination: Pubkey::new_unique(),
                }),
                ..Default::default()
            },
            groups: vec![Group {
                label: "WL".to_string(),
                guards: GuardSet {
                    mint_limit: Some(MintLimit { id: 3, limit: 1 }),
                    ..Default::default()
                },
            }],
        }
    }

    #[test]
    fn test_matching_group_is_selected() {
        let config = config_with_wl_group();
        let group = select_guard("WL", Some(&config), &MintLogger::default());

        assert_eq!(group.label, "WL");
        assert_eq!(group.group_arg(), Some("WL"));
        assert!(group.is_active(GuardKind::MintLimit));
        assert!(!group.is_active(GuardKind::SolPayment));
    }

    #[test]
    fn test_unknown_label_falls_back_to_default_guards() {
        let config = config_with_wl_group();
        let group = select_guard("OG", Some(&config), &MintLogger::default());

        assert_eq!(group.label, DEFAULT_GROUP_LABEL);
        assert_eq!(group.guards.as_ref(), Some(&config.default));
        assert_eq!(group.group_arg(), None);
    }

    #[test]
    fn test_missing_config_yields_unconfigured_default() {
        let group = select_guard("WL", None, &MintLogger::default());

        assert_eq!(group.label, DEFAULT_GROUP_LABEL);
        assert!(group.guards.is_none());
    }
}
