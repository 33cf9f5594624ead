//! drog CLI - Upload files, stdin or web pages to Google Drive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncRead;
use tracing_subscriber::EnvFilter;

use drog::auth::InteractiveCodePrompt;
use drog::config::{default_client_secret_path, default_token_cache_path};
use drog::notify::{DesktopNotifier, Notifier, SilentNotifier};
use drog::prompt::{Prompter, TerminalPrompter};
use drog::upload::{ExtensionSpec, Invocation, Orchestrator, TitleSpec};
use drog::{
    Authenticator, ClientConfig, CredentialStore, DriveClient, DriveError, FileMetadata,
    PageFetcher, Reporter,
};

const USAGE: &str = "\
Usage:
  drog <path> <-ask|title>
  echo \"something\" | drog -- <-ask|title> <-ask|.csv|.html|.txt>
  drog <--url|-u> <http://...> <-ask|-onpage|title>";

/// A commandline tool for uploading files to Google Drive.
#[derive(Parser, Debug)]
#[command(name = "drog")]
#[command(author, version, about, long_about = None, after_help = USAGE)]
struct Cli {
    /// Fetch this web page and upload its HTML.
    #[arg(long, short = 'u', value_name = "URL")]
    url: Option<String>,

    /// Path to the OAuth client secret JSON file [default: ~/.google_drive_client_secret.json].
    #[arg(long, env = "DROG_CLIENT_SECRET")]
    client_secret: Option<PathBuf>,

    /// Path to the cached credential [default: ~/.credentials/drog-drive.json].
    #[arg(long, env = "DROG_TOKEN_CACHE")]
    token_cache: Option<PathBuf>,

    /// Do not show a desktop notification on success.
    #[arg(long)]
    no_notify: bool,

    /// <path> <title>, or <title> with --url.
    #[arg(allow_hyphen_values = true, value_name = "ARGS")]
    operands: Vec<String>,

    /// <title> <extension>: upload content piped on stdin.
    #[arg(last = true, allow_hyphen_values = true, value_name = "STDIN_ARGS")]
    piped: Vec<String>,
}

impl Cli {
    /// Select the invocation mode from the positional arguments.
    fn invocation(&self) -> drog::Result<Invocation> {
        match (&self.url, self.operands.as_slice(), self.piped.as_slice()) {
            (None, [path, title], []) => Ok(Invocation::Path {
                path: PathBuf::from(path),
                title: TitleSpec::from_arg(title, false),
            }),
            (None, [], [title, extension]) => Ok(Invocation::Stream {
                title: TitleSpec::from_arg(title, false),
                extension: ExtensionSpec::from_arg(extension),
            }),
            (Some(url), [title], []) => Ok(Invocation::Url {
                url: url.clone(),
                title: TitleSpec::from_arg(title, true),
            }),
            _ => Err(DriveError::InvalidInvocation(format!(
                "wrong number of arguments\n\n{}",
                USAGE
            ))),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DROG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let prompter = TerminalPrompter;
    let created = run(&cli, &prompter, PageFetcher::new(), tokio::io::stdin()).await?;

    let notifier: Box<dyn Notifier> = if cli.no_notify {
        Box::new(SilentNotifier)
    } else {
        Box::new(DesktopNotifier)
    };
    Reporter::new(notifier).report(&created);

    Ok(())
}

/// Resolve, authenticate and upload.
///
/// Client configuration is loaded right after the arguments, so a missing or
/// invalid file fails before any prompt, page fetch or read from stdin.
async fn run<R>(
    cli: &Cli,
    prompter: &dyn Prompter,
    fetcher: PageFetcher,
    stdin: R,
) -> Result<FileMetadata>
where
    R: AsyncRead + Unpin,
{
    let invocation = cli.invocation()?;

    let secret_path = match &cli.client_secret {
        Some(path) => path.clone(),
        None => default_client_secret_path()?,
    };
    let config = ClientConfig::from_file(&secret_path)
        .with_context(|| format!("Failed to load client configuration from {:?}", secret_path))?;

    let cache_path = match &cli.token_cache {
        Some(path) => path.clone(),
        None => default_token_cache_path()?,
    };

    let request = Orchestrator::new(prompter, fetcher)
        .prepare(invocation, stdin)
        .await
        .context("Upload FAILED")?;

    let auth = Authenticator::new(config, CredentialStore::new(&cache_path));
    let session = auth
        .get_session(&mut InteractiveCodePrompt::new(prompter))
        .await
        .context("Unable to obtain Google Drive credentials")?;

    DriveClient::new(session)
        .create_document(request)
        .await
        .context("Upload FAILED")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("drog").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_path_mode() {
        let cli = parse(&["report.xlsx", "Q1"]);
        assert_eq!(
            cli.invocation().unwrap(),
            Invocation::Path {
                path: PathBuf::from("report.xlsx"),
                title: TitleSpec::Literal("Q1".to_string()),
            }
        );
    }

    #[test]
    fn test_path_mode_ask() {
        let cli = parse(&["notes.txt", "-ask"]);
        assert_eq!(
            cli.invocation().unwrap(),
            Invocation::Path {
                path: PathBuf::from("notes.txt"),
                title: TitleSpec::Ask,
            }
        );
    }

    #[test]
    fn test_stream_mode() {
        let cli = parse(&["--", "-ask", ".csv"]);
        assert_eq!(
            cli.invocation().unwrap(),
            Invocation::Stream {
                title: TitleSpec::Ask,
                extension: ExtensionSpec::Literal(".csv".to_string()),
            }
        );
    }

    #[test]
    fn test_url_mode() {
        for flag in ["--url", "-u"] {
            let cli = parse(&[flag, "https://example.com", "-onpage"]);
            assert_eq!(
                cli.invocation().unwrap(),
                Invocation::Url {
                    url: "https://example.com".to_string(),
                    title: TitleSpec::OnPage,
                }
            );
        }
    }

    #[test]
    fn test_wrong_argument_count() {
        let err = parse(&["only-one"]).invocation().unwrap_err();
        assert!(matches!(err, DriveError::InvalidInvocation(_)));
        assert!(err.to_string().contains("Usage:"));
        assert!(parse(&["a", "b", "c"]).invocation().is_err());
        assert!(parse(&["--", "title"]).invocation().is_err());
        assert!(parse(&["-u", "https://example.com"]).invocation().is_err());
        assert!(parse(&["file", "title", "--", "t", ".txt"]).invocation().is_err());
    }

    #[test]
    fn test_options_and_env_paths() {
        let cli = parse(&[
            "--client-secret",
            "/tmp/secret.json",
            "--token-cache",
            "/tmp/token.json",
            "--no-notify",
            "a.csv",
            "t",
        ]);
        assert_eq!(cli.client_secret, Some(PathBuf::from("/tmp/secret.json")));
        assert_eq!(cli.token_cache, Some(PathBuf::from("/tmp/token.json")));
        assert!(cli.no_notify);
        assert!(cli.invocation().is_ok());
    }

    /// Records every question and answers it with a fixed title.
    #[derive(Default)]
    struct RecordingPrompter {
        asked: RefCell<Vec<String>>,
    }

    impl Prompter for RecordingPrompter {
        fn ask(&self, prompt: &str, _default: &str) -> drog::Result<String> {
            self.asked.borrow_mut().push(prompt.to_string());
            Ok("typed".to_string())
        }
    }

    #[tokio::test]
    async fn test_missing_client_configuration_fails_before_prompt_or_fetch() {
        let mut server = mockito::Server::new_async().await;
        let page = server.mock("GET", "/").expect(0).create_async().await;
        let dir = tempfile::tempdir().unwrap();
        let secret = dir.path().join("absent_client_secret.json");
        let cache = dir.path().join("token.json");
        let url = server.url();
        let cli = parse(&[
            "--client-secret",
            secret.to_str().unwrap(),
            "--token-cache",
            cache.to_str().unwrap(),
            "-u",
            url.as_str(),
            "-ask",
        ]);
        let prompter = RecordingPrompter::default();

        let err = run(&cli, &prompter, PageFetcher::new(), tokio::io::empty())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DriveError>(),
            Some(DriveError::ConfigError(_))
        ));
        assert!(prompter.asked.borrow().is_empty());
        page.assert_async().await;
        assert!(!cache.exists());
    }

    #[tokio::test]
    async fn test_wrong_arguments_fail_before_configuration() {
        let cli = parse(&["--client-secret", "/nonexistent/secret.json", "only-one"]);
        let prompter = RecordingPrompter::default();

        let err = run(&cli, &prompter, PageFetcher::new(), tokio::io::empty())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DriveError>(),
            Some(DriveError::InvalidInvocation(_))
        ));
    }

    #[test]
    fn test_help_is_not_an_error_kind() {
        let err = Cli::try_parse_from(["drog", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
