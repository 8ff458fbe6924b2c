use std::collections::VecDeque;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use admin_logging::{admin_debug, admin_info};
use anyhow::{bail, Context, Result};
use makler_client::{AtomicFileWriter, ReqwestAdminApi, SequentialQueue};
use makler_core::{decode, update, AdminState, AdminViewModel, LinkAction, Msg, Severity};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::render::{render, render_decoded, Section};
use crate::cli::{Cli, Command};

/// What a command does once configuration and logging are in place.
#[derive(Debug, PartialEq)]
enum Plan {
    /// Pure codec work, no backend involved.
    Decode(String),
    Dispatch {
        msgs: Vec<Msg>,
        sections: Vec<Section>,
    },
}

pub fn run_app(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(&cli)?;
    logging::initialize(config.log, cli.verbose);
    if let Some(source) = &config.source {
        admin_info!("Loaded config from {}", source.display());
    }

    let (msgs, sections) = match plan(cli.command)? {
        Plan::Decode(url) => {
            let decoded = decode(&url).context("cannot decode search url")?;
            print!("{}", render_decoded(&decoded));
            return Ok(());
        }
        Plan::Dispatch { msgs, sections } => (msgs, sections),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let api = ReqwestAdminApi::new(config.client.clone()).context("invalid backend url")?;
    admin_debug!("Using backend {}", config.client.base_url);
    let runner = EffectRunner::new(
        &api,
        SequentialQueue::new(config.bulk),
        AtomicFileWriter::new(config.output_dir.clone()),
    );

    let state = runtime.block_on(drive(AdminState::new(), msgs, &runner));
    let view = state.view();

    match view.status.clone().filter(|s| s.severity == Severity::Error) {
        Some(status) => {
            let view = AdminViewModel {
                status: None,
                ..view
            };
            print!("{}", render(&view, &sections));
            bail!("{}", status.text)
        }
        None => {
            print!("{}", render(&view, &sections));
            Ok(())
        }
    }
}

/// Feeds messages through `update` and executes the resulting effects in
/// order until no work is left.
async fn drive(mut state: AdminState, initial: Vec<Msg>, runner: &EffectRunner<'_>) -> AdminState {
    let mut queue: VecDeque<Msg> = initial.into();
    while let Some(msg) = queue.pop_front() {
        let (next, effects) = update(state, msg);
        state = next;
        for effect in effects {
            admin_debug!("Running effect {:?}", effect);
            queue.push_back(runner.run(effect).await);
        }
    }
    state
}

fn plan(command: Command) -> Result<Plan> {
    let dispatch = |msg: Msg, sections: &[Section]| Plan::Dispatch {
        msgs: vec![msg],
        sections: sections.to_vec(),
    };

    Ok(match command {
        Command::Brokers => dispatch(Msg::RefreshRequested, &[Section::Brokers]),
        Command::AddBroker { name } => {
            dispatch(Msg::AddBrokerSubmitted(name), &[Section::Brokers])
        }
        Command::RemoveBroker { name, yes } => {
            require_confirmation(yes, "remove-broker")?;
            dispatch(Msg::RemoveBrokerConfirmed(name), &[Section::Brokers])
        }
        Command::AddLink { broker, link } => {
            dispatch(Msg::AddLinkSubmitted { broker, link }, &[Section::Brokers])
        }
        Command::RemoveLink { broker, link } => {
            dispatch(Msg::RemoveLinkClicked { broker, link }, &[Section::Brokers])
        }
        Command::ImportLinks { broker, file, .. } => {
            let text = read_input(file)?;
            dispatch(Msg::BulkLinksSubmitted { broker, text }, &[Section::Brokers])
        }
        Command::Search { brokers } => dispatch(
            Msg::SearchSubmitted(brokers),
            &[Section::Search, Section::Links],
        ),
        Command::Links(filter) => dispatch(
            Msg::LinkQuerySubmitted {
                input: filter.to_input(),
                action: LinkAction::List,
            },
            &[Section::Links],
        ),
        Command::DeleteLinks { filter, yes } => {
            require_confirmation(yes, "delete-links")?;
            dispatch(
                Msg::LinkQuerySubmitted {
                    input: filter.to_input(),
                    action: LinkAction::Delete,
                },
                &[Section::Links],
            )
        }
        Command::Export { scope, filter } => dispatch(
            Msg::LinkQuerySubmitted {
                input: filter.to_input(),
                action: LinkAction::Export(scope.into()),
            },
            &[],
        ),
        Command::GenerateUrls {
            template,
            postal_codes,
            file,
            located,
        } => {
            let postal_text = match postal_codes {
                Some(text) => text,
                None => read_input(file)?,
            };
            let template = template.to_spec();
            let msg = if located {
                Msg::LocatedUrlsRequested {
                    template,
                    postal_text,
                }
            } else {
                Msg::UrlsRequested {
                    template,
                    postal_text,
                }
            };
            dispatch(msg, &[Section::Urls])
        }
        Command::DecodeUrl { url } => Plan::Decode(url),
        Command::ClearBlacklist { yes } => {
            require_confirmation(yes, "clear-blacklist")?;
            dispatch(Msg::ClearBlacklistConfirmed, &[])
        }
    })
}

fn require_confirmation(yes: bool, command: &str) -> Result<()> {
    if !yes {
        bail!("{command} cannot be undone; pass --yes to confirm");
    }
    Ok(())
}

/// Reads the file when given, otherwise all of stdin.
fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use makler_core::{ExportScope, FilterInput};
    use pretty_assertions::assert_eq;

    use super::*;

    fn plan_for(args: &[&str]) -> Result<Plan> {
        let cli = Cli::parse_from(std::iter::once("makler_admin").chain(args.iter().copied()));
        plan(cli.command)
    }

    #[test]
    fn destructive_commands_need_confirmation() {
        assert!(plan_for(&["remove-broker", "Meyer"]).is_err());
        assert!(plan_for(&["delete-links", "--year", "2026"]).is_err());
        assert!(plan_for(&["clear-blacklist"]).is_err());
        assert!(plan_for(&["clear-blacklist", "--yes"]).is_ok());
    }

    #[test]
    fn export_scope_reaches_the_link_query() {
        let plan = plan_for(&["export", "--scope", "last", "-b", "Meyer"]).unwrap();
        assert_eq!(
            plan,
            Plan::Dispatch {
                msgs: vec![Msg::LinkQuerySubmitted {
                    input: FilterInput {
                        broker_names: vec!["Meyer".to_string()],
                        ..FilterInput::default()
                    },
                    action: LinkAction::Export(ExportScope::LastSearch),
                }],
                sections: vec![],
            }
        );
    }

    #[test]
    fn import_reads_links_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("links.txt");
        fs::write(&path, "https://x/1\nhttps://x/2\n").unwrap();

        let plan = plan_for(&["import-links", "Meyer", "--file", path.to_str().unwrap()]).unwrap();
        let Plan::Dispatch { msgs, .. } = plan else {
            panic!("expected dispatch");
        };
        assert_eq!(
            msgs,
            vec![Msg::BulkLinksSubmitted {
                broker: "Meyer".to_string(),
                text: "https://x/1\nhttps://x/2\n".to_string(),
            }]
        );
    }

    #[test]
    fn inline_postal_codes_generate_locally() {
        let plan = plan_for(&["generate-urls", "--postal-codes", "10115,04109", "--provider", "privat"])
            .unwrap();
        let Plan::Dispatch { msgs, sections } = plan else {
            panic!("expected dispatch");
        };
        assert_eq!(sections, vec![Section::Urls]);
        assert!(matches!(
            &msgs[0],
            Msg::UrlsRequested { template, postal_text }
                if template.provider_type.as_deref() == Some("privat") && postal_text == "10115,04109"
        ));
    }
}
