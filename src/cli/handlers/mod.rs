mod interactive;
pub use interactive::run_interactive;

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use log::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::prompt::Interrupt;
use crate::io::remote::RemoteStore;
use crate::io::sync_client::SyncClient;
use crate::io::{config_io, logging};
use crate::ops::classify::DateFilter;
use crate::ops::mutate::{self, NewTask, TaskChanges};
use crate::ops::projection::{ViewOptions, build_view};
use crate::ops::session::Session;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a verb needs: the session plus display settings.
pub struct Context<S: RemoteStore> {
    pub session: Session<S>,
    pub color: bool,
    pub note_marker: String,
}

impl<S: RemoteStore> Context<S> {
    pub fn new(session: Session<S>) -> Self {
        Context {
            session,
            color: true,
            note_marker: String::new(),
        }
    }

    /// Render the task tables as of `now`
    pub fn view_lines(
        &self,
        project: Option<&str>,
        date: Option<DateFilter>,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let options = ViewOptions {
            project,
            date,
            note_marker: &self.note_marker,
        };
        format_view(&build_view(self.session.replica(), now, &options), self.color)
    }
}

fn print_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let command = match cli.command {
        // Unknown verbs do nothing, not even a pull
        Some(Commands::Other(_)) => return Ok(()),
        Some(command) => command,
        None => Commands::Interactive,
    };

    let config = config_io::read_config()?;
    let _logger = logging::init(&config.log)?;
    let token = config_io::resolve_token(std::env::var("TODOIST_TOKEN").ok(), &config);
    let session = Session::open(SyncClient::new(&config.api, token))?;
    let mut ctx = Context {
        session,
        color: config.ui.color && !cli.no_color,
        note_marker: config.ui.note_marker.clone(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Commands::Interactive => {
            // Single-shot verbs keep the default Ctrl-C, which ends the process
            let interrupt = Interrupt::default();
            let handler = interrupt.clone();
            ctrlc::set_handler(move || handler.trigger())?;
            let stdin = io::stdin();
            run_interactive(&mut ctx, &mut stdin.lock(), &mut out, &interrupt)
        }
        command => run(&mut ctx, command, &mut out),
    }
}

/// Run one single-shot verb
pub fn run<S: RemoteStore>(
    ctx: &mut Context<S>,
    command: Commands,
    out: &mut impl Write,
) -> CmdResult {
    match command {
        // Read commands
        Commands::List(args) => cmd_list(ctx, args.project.as_deref(), args.date, out),
        Commands::Today(args) => {
            cmd_list(ctx, args.project.as_deref(), Some(DateFilter::Today), out)
        }
        Commands::Tomorrow(args) => {
            cmd_list(ctx, args.project.as_deref(), Some(DateFilter::Tomorrow), out)
        }
        Commands::Projects => cmd_projects(ctx, out),
        Commands::Comments(args) => cmd_comments(ctx, &args.tasks, out),

        // Write commands
        Commands::Add(args) => cmd_add(
            ctx,
            NewTask {
                content: args.content,
                project: args.project,
                due: args.date,
                labels: Some(args.labels),
                priority: args.priority,
            },
            out,
        ),
        Commands::Update(args) => cmd_update(
            ctx,
            &args.tasks,
            TaskChanges {
                due: args.date,
                content: args.content,
                labels: Some(args.labels),
                priority: args.priority,
            },
            out,
        ),
        Commands::Complete(args) => cmd_complete(ctx, &args.tasks, out),
        Commands::Delete(args) => cmd_delete(ctx, &args.tasks, out),
        Commands::Sync => cmd_sync(ctx),

        Commands::Interactive | Commands::Other(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

pub fn cmd_list<S: RemoteStore>(
    ctx: &Context<S>,
    project: Option<&str>,
    date: Option<DateFilter>,
    out: &mut impl Write,
) -> CmdResult {
    print_lines(out, &ctx.view_lines(project, date, Utc::now()))?;
    Ok(())
}

pub fn cmd_projects<S: RemoteStore>(ctx: &Context<S>, out: &mut impl Write) -> CmdResult {
    for name in ctx.session.replica().project_names().keys() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

pub fn cmd_comments<S: RemoteStore>(
    ctx: &Context<S>,
    ids: &[i64],
    out: &mut impl Write,
) -> CmdResult {
    let replica = ctx.session.replica();
    for &id in ids {
        for note in replica.notes(id) {
            print_lines(out, &format_note(note))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

pub fn cmd_add<S: RemoteStore>(
    ctx: &mut Context<S>,
    new_task: NewTask,
    out: &mut impl Write,
) -> CmdResult {
    let lines = mutate::add(&mut ctx.session, new_task)?;
    print_lines(out, &lines)?;
    Ok(())
}

pub fn cmd_update<S: RemoteStore>(
    ctx: &mut Context<S>,
    ids: &[i64],
    changes: TaskChanges,
    out: &mut impl Write,
) -> CmdResult {
    if ids.is_empty() {
        debug!("update without task ids, nothing to do");
        return Ok(());
    }
    let lines = mutate::update(&mut ctx.session, ids, changes)?;
    print_lines(out, &lines)?;
    Ok(())
}

pub fn cmd_complete<S: RemoteStore>(
    ctx: &mut Context<S>,
    ids: &[i64],
    out: &mut impl Write,
) -> CmdResult {
    if ids.is_empty() {
        return Ok(());
    }
    let lines = mutate::complete(&mut ctx.session, ids)?;
    print_lines(out, &lines)?;
    Ok(())
}

pub fn cmd_delete<S: RemoteStore>(
    ctx: &mut Context<S>,
    ids: &[i64],
    out: &mut impl Write,
) -> CmdResult {
    if ids.is_empty() {
        return Ok(());
    }
    let lines = mutate::delete(&mut ctx.session, ids)?;
    print_lines(out, &lines)?;
    Ok(())
}

pub fn cmd_sync<S: RemoteStore>(ctx: &mut Context<S>) -> CmdResult {
    ctx.session.sync()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mutation::Mutation;
    use crate::model::priority::Priority;
    use crate::ops::test_helpers::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn context() -> Context<FakeStore> {
        let session = Session::open(FakeStore::new(sample_snapshot())).unwrap();
        Context::new(session)
    }

    fn run_line(ctx: &mut Context<FakeStore>, args: &[&str]) -> (CmdResult, String) {
        let cli = Cli::parse_from(std::iter::once("td").chain(args.iter().copied()));
        let mut out = Vec::new();
        let result = run(ctx, cli.command.unwrap(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn projects_in_replica_order() {
        let (result, out) = run_line(&mut context(), &["projects"]);
        assert!(result.is_ok());
        assert_eq!(out, "Inbox\nWork\n");
    }

    #[test]
    fn comments_print_posted_then_body() {
        let (_, out) = run_line(&mut context(), &["comments", "-t", "2b"]);
        assert_eq!(
            out,
            "Tue 13 May 2025 09:00:00 +0000:\nAsk about the invoice\n\n"
        );
    }

    #[test]
    fn comments_for_task_without_notes() {
        let (_, out) = run_line(&mut context(), &["comments", "-t", "2a"]);
        assert_eq!(out, "");
    }

    #[test]
    fn view_lines_respect_filters() {
        let mut ctx = context();
        ctx.color = false;
        let lines = ctx.view_lines(Some("Work"), Some(DateFilter::Tomorrow), now());
        assert_eq!(lines[0], "Work");
        assert!(lines[4].contains("Tomorrow 9:30"));

        let lines = ctx.view_lines(Some("Work"), Some(DateFilter::Today), now());
        assert_eq!(lines, vec![ALL_COMPLETED]);
    }

    #[test]
    fn add_prints_confirmation_after_commit() {
        let mut ctx = context();
        let (result, out) = run_line(
            &mut ctx,
            &["add", "-c", "Water plants", "-p", "Inbox", "-P", "1"],
        );
        assert!(result.is_ok());
        assert_eq!(out, "Water plants added\n");
        assert_eq!(
            ctx.session.store().pushed,
            vec![vec![Mutation::Add {
                content: "Water plants".into(),
                project_id: Some(1),
                due: None,
                label_ids: None,
                priority: Some(Priority::HIGHEST),
            }]]
        );
    }

    #[test]
    fn add_to_unknown_project_prints_nothing() {
        let mut ctx = context();
        let (result, out) = run_line(
            &mut ctx,
            &["add", "-c", "Call dentist", "-p", "NoSuchProject"],
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "unknown project: NoSuchProject"
        );
        assert_eq!(out, "");
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn update_without_fields_names_the_task() {
        let mut ctx = context();
        let (_, out) = run_line(&mut ctx, &["update", "-t", "2a"]);
        assert_eq!(out, "Task 2a updated\n");
        assert_eq!(ctx.session.store().pushed, vec![Vec::<Mutation>::new()]);
    }

    #[test]
    fn write_verbs_without_ids_do_nothing() {
        let mut ctx = context();
        for verb in ["complete", "delete", "update"] {
            let (result, out) = run_line(&mut ctx, &[verb]);
            assert!(result.is_ok());
            assert_eq!(out, "");
        }
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn complete_and_delete_confirm_each_task() {
        let mut ctx = context();
        let (_, out) = run_line(&mut ctx, &["complete", "-t", "2a", "2b"]);
        assert_eq!(
            out,
            "Task \"Buy milk\" completed\nTask \"Call bank\" completed\n"
        );
        let (_, out) = run_line(&mut ctx, &["delete", "-t", "2c"]);
        assert_eq!(out, "Task \"Read book\" deleted\n");
    }

    #[test]
    fn offline_commit_is_an_error() {
        let mut ctx = context();
        ctx.session.store_mut().offline = true;
        let (result, out) = run_line(&mut ctx, &["complete", "-t", "2a"]);
        assert!(result.is_err());
        assert_eq!(out, "");
    }

    #[test]
    fn sync_is_silent() {
        let mut ctx = context();
        let (result, out) = run_line(&mut ctx, &["sync"]);
        assert!(result.is_ok());
        assert_eq!(out, "");
        assert_eq!(ctx.session.store().pulls, 2);
    }
}
