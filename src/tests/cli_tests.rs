use crate::cli::commands::{ExpensesCommand, parse_member_value};
use crate::cli::{Cli, Command};
use crate::config::{Config, DEFAULT_PREFERENCES_PATH};
use crate::core::errors::FairshareError;
use crate::core::pagination::{PageSize, Sort, SortDirection};
use crate::core::split::SplitMode;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_add_expense_arguments() {
    let cli = Cli::try_parse_from([
        "fairshare",
        "--api-base-url",
        "http://localhost:8080",
        "expenses",
        "add",
        "--group",
        "7",
        "--description",
        "Dinner",
        "--amount",
        "20.00",
        "--split",
        "exact",
        "--value",
        "1=12.00",
        "--value",
        "2=8.00",
    ])
    .unwrap();

    assert_eq!(cli.api_base_url.as_deref(), Some("http://localhost:8080"));
    match cli.command {
        Command::Expenses(ExpensesCommand::Add(add)) => {
            assert_eq!(add.group, 7);
            assert_eq!(add.payer, None);
            assert_eq!(add.split.split, Some(SplitMode::Exact));
            assert_eq!(
                add.split.values,
                vec![(1, "12.00".to_string()), (2, "8.00".to_string())]
            );
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_list_arguments_default_and_validate() {
    let cli = Cli::try_parse_from(["fairshare", "history", "-g", "3", "--sort", "createdAt,asc"]).unwrap();
    match cli.command {
        Command::History(history) => {
            let request = history.list.request(Sort::created_desc());
            assert_eq!(request.page, 1);
            assert_eq!(request.size, PageSize::Ten);
            assert_eq!(request.sort, Sort::new("createdAt", SortDirection::Asc));
        }
        other => panic!("unexpected command {:?}", other),
    }

    assert!(Cli::try_parse_from(["fairshare", "history", "-g", "3", "--size", "7"]).is_err());
}

#[test]
fn test_member_value_parsing() {
    assert_eq!(parse_member_value(" 3 = 12.50 "), Ok((3, "12.50".to_string())));
    assert!(parse_member_value("12.50").is_err());
    assert!(parse_member_value("bob=1").is_err());
}

#[test]
fn test_base_url_flag_wins_over_environment() {
    let config = Config {
        api_base_url: Some("http://env:8080".to_string()),
        log_level: "info".to_string(),
        preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
    };
    assert_eq!(config.base_url(Some(" http://flag:9090 ")).unwrap(), "http://flag:9090");
    assert_eq!(config.base_url(Some("")).unwrap(), "http://env:8080");

    let unset = Config {
        api_base_url: None,
        ..config
    };
    assert!(matches!(unset.base_url(None), Err(FairshareError::MissingBaseUrl)));
}
