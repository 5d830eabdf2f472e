use super::*;

fn smtp_raw() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.mail.smtp_host = Some("smtp.example.com".to_string());
    raw.mail.smtp_port = Some(587);
    raw.mail.smtp_user = Some("orders@example.com".to_string());
    raw.mail.smtp_pass = Some("secret".to_string());
    raw.mail.notify_to = Some("farm@example.com".to_string());
    raw
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.store.path, PathBuf::from("db/data.json"));
    assert_eq!(settings.catalog.cache_ttl, Duration::from_secs(300));
    assert!(settings.mail.smtp.is_none());
    assert_eq!(settings.mail.timeout, Duration::from_secs(10));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_ttl_is_allowed() {
    let mut raw = RawSettings::default();
    raw.catalog.cache_ttl_seconds = Some(0);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.catalog.cache_ttl, Duration::ZERO);
}

#[test]
fn invalid_log_level_names_the_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn smtp_host_enables_mail_and_sender_defaults_to_user() {
    let settings = Settings::from_raw(smtp_raw()).expect("valid settings");
    let smtp = settings.mail.smtp.expect("mail enabled");

    assert_eq!(smtp.host, "smtp.example.com");
    assert_eq!(smtp.from, "orders@example.com");
    assert_eq!(smtp.notify_to, "farm@example.com");
    assert!(!format!("{smtp:?}").contains("secret"));
}

#[test]
fn explicit_disable_wins_over_smtp_host() {
    let mut raw = smtp_raw();
    raw.mail.enabled = Some(false);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.mail.smtp.is_none());
}

#[test]
fn enabled_mail_requires_every_smtp_value() {
    let mut raw = smtp_raw();
    raw.mail.smtp_pass = Some("  ".to_string());
    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(err, LoadError::Invalid { key: "mail.smtp_pass", .. }));

    let mut raw = RawSettings::default();
    raw.mail.enabled = Some(true);
    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(err, LoadError::Invalid { key: "mail.smtp_host", .. }));
}

#[test]
fn recipient_defaults_to_smtp_user() {
    let mut raw = smtp_raw();
    raw.mail.notify_to = None;
    let smtp = Settings::from_raw(raw)
        .expect("valid settings")
        .mail
        .smtp
        .expect("mail enabled");
    assert_eq!(smtp.notify_to, "orders@example.com");
}

#[test]
fn mail_cli_overrides_apply() {
    let mut raw = smtp_raw();
    let overrides = MailOverrides {
        smtp_port: Some(465),
        from: Some("shop@example.com".to_string()),
        ..Default::default()
    };

    raw.apply_mail_overrides(&overrides);
    let smtp = Settings::from_raw(raw)
        .expect("valid settings")
        .mail
        .smtp
        .expect("mail enabled");

    assert_eq!(smtp.port, 465);
    assert_eq!(smtp.from, "shop@example.com");
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["poshpoule"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "poshpoule",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--store-path",
        "/var/lib/poshpoule/data.json",
        "--catalog-cache-ttl-seconds",
        "60",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.store.store_path.as_deref(),
                Some(std::path::Path::new("/var/lib/poshpoule/data.json"))
            );
            assert_eq!(serve.overrides.catalog_cache_ttl_seconds, Some(60));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_init_and_check_arguments() {
    let args = CliArgs::parse_from(["poshpoule", "init", "--store-path", "/tmp/data.json"]);
    match args.command.expect("init command") {
        Command::Init(init) => {
            assert_eq!(
                init.store.store_path.as_deref(),
                Some(std::path::Path::new("/tmp/data.json"))
            );
        }
        _ => panic!("wrong command parsed"),
    }

    let args = CliArgs::parse_from(["poshpoule", "check"]);
    assert!(matches!(args.command, Some(Command::Check(_))));
}

#[test]
fn mail_flags_are_global() {
    let args = CliArgs::parse_from([
        "poshpoule",
        "serve",
        "--smtp-host",
        "smtp.example.com",
        "--mail-enabled=false",
    ]);
    assert_eq!(args.mail.smtp_host.as_deref(), Some("smtp.example.com"));
    assert_eq!(args.mail.enabled, Some(false));
}
