use super::*;

fn bare_cli() -> Cli {
    Cli { daemon: false, debug: false, children_max: None, exec_delay: None, event_timeout: None, resolve_names: None }
}

#[test]
fn cli_flags_take_precedence_over_cmdline_overrides() {
    let cli = Cli { children_max: Some(3), ..bare_cli() };
    let cmdline = CmdlineOverrides { children_max: Some(99), ..Default::default() };

    let config = Config::build(&cli, &cmdline);
    assert_eq!(config.children_max, 3);
}

#[test]
fn cmdline_overrides_apply_when_cli_is_silent() {
    let cli = bare_cli();
    let cmdline = CmdlineOverrides { event_timeout: Some(42), ..Default::default() };

    let config = Config::build(&cli, &cmdline);
    assert_eq!(config.event_timeout, Duration::from_secs(42));
}

#[test]
fn defaults_apply_when_nothing_overrides_them() {
    let config = Config::build(&bare_cli(), &CmdlineOverrides::default());
    assert_eq!(config.event_timeout, Duration::from_secs(180));
    assert_eq!(config.exec_delay, Duration::ZERO);
    assert_eq!(config.resolve_names, ResolveNames::Late);
    assert!(config.children_max >= 10);
}

#[test]
fn resolve_names_parses_all_three_values() {
    for (raw, expected) in [("early", ResolveNames::Early), ("late", ResolveNames::Late), ("never", ResolveNames::Never)]
    {
        let cli = Cli { resolve_names: Some(raw.to_string()), ..bare_cli() };
        let config = Config::build(&cli, &CmdlineOverrides::default());
        assert_eq!(config.resolve_names, expected);
    }
}

#[test]
fn unrecognized_resolve_names_value_falls_back_to_default() {
    let cli = Cli { resolve_names: Some("whenever".to_string()), ..bare_cli() };
    let config = Config::build(&cli, &CmdlineOverrides::default());
    assert_eq!(config.resolve_names, ResolveNames::Late);
}
