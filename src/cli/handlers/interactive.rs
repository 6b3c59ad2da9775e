use std::io::{self, BufRead, Write};

use log::debug;

use super::{
    CmdResult, Context, cmd_add, cmd_comments, cmd_complete, cmd_delete, cmd_list, cmd_projects,
    cmd_sync, cmd_update,
};
use crate::cli::commands::parse_task_id;
use crate::cli::prompt::{Interrupt, Prompter};
use crate::io::remote::RemoteStore;
use crate::ops::classify::DateFilter;
use crate::ops::mutate::{NewTask, TaskChanges};

pub const PROMPT: &str = "(todoist) ";

enum Flow {
    Continue,
    Quit,
}

/// `-p` / `-d` on the read verbs
#[derive(Debug, Default, PartialEq)]
struct ListFlags {
    project: Option<String>,
    date: Option<DateFilter>,
}

fn parse_list_flags(args: &[String]) -> Result<ListFlags, String> {
    let mut flags = ListFlags::default();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", arg))
        };
        match arg.as_str() {
            "-p" | "--project" => flags.project = Some(value()?),
            "-d" | "--date" => flags.date = Some(value()?.parse()?),
            other => return Err(format!("unexpected argument '{}'", other)),
        }
    }
    Ok(flags)
}

fn parse_ids(args: &[String]) -> Result<Vec<i64>, String> {
    args.iter().map(|a| parse_task_id(a)).collect()
}

fn has_kind(e: &(dyn std::error::Error + 'static), kind: io::ErrorKind) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == kind)
}

/// Read-eval loop over `input` until `quit`, `exit` or end of input.
///
/// When `interrupt` fires during a read, the line or the command being
/// entered is dropped and the loop returns to the prompt.
pub fn run_interactive<S: RemoteStore, R: BufRead, W: Write>(
    ctx: &mut Context<S>,
    input: &mut R,
    out: &mut W,
    interrupt: &Interrupt,
) -> CmdResult {
    loop {
        // Presses while a command was running do not carry over
        interrupt.take();
        write!(out, "{}", PROMPT)?;
        out.flush()?;
        let line = match Prompter::new(input, out)
            .with_interrupt(interrupt)
            .read_line()
        {
            Ok(Some(line)) => line,
            Ok(None) => {
                writeln!(out)?;
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                writeln!(out)?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let words = match shell_words::split(&line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };
        let Some((verb, args)) = words.split_first() else {
            continue;
        };

        let mut prompter = Prompter::new(input, out).with_interrupt(interrupt);
        match execute(ctx, verb, args, &mut prompter) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => return Ok(()),
            Err(e) if has_kind(e.as_ref(), io::ErrorKind::Interrupted) => writeln!(out)?,
            Err(e) if has_kind(e.as_ref(), io::ErrorKind::UnexpectedEof) => {
                writeln!(out)?;
                return Ok(());
            }
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }
}

/// Ids from the command line, or one asked for after showing the list
fn task_ids<S: RemoteStore, R: BufRead, W: Write>(
    ctx: &Context<S>,
    args: &[String],
    prompter: &mut Prompter<'_, R, W>,
) -> Result<Vec<i64>, Box<dyn std::error::Error>> {
    if !args.is_empty() {
        return Ok(parse_ids(args)?);
    }
    cmd_list(ctx, None, None, prompter.out())?;
    let open = ctx.session.replica().incomplete_task_ids();
    Ok(vec![prompter.ask_task(&open)?])
}

fn execute<S: RemoteStore, R: BufRead, W: Write>(
    ctx: &mut Context<S>,
    verb: &str,
    args: &[String],
    prompter: &mut Prompter<'_, R, W>,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match verb {
        "quit" | "exit" => return Ok(Flow::Quit),
        "list" | "today" | "tomorrow" => {
            let mut flags = parse_list_flags(args)?;
            match verb {
                "today" => flags.date = Some(DateFilter::Today),
                "tomorrow" => flags.date = Some(DateFilter::Tomorrow),
                _ => {}
            }
            cmd_list(ctx, flags.project.as_deref(), flags.date, prompter.out())?;
        }
        "projects" => cmd_projects(ctx, prompter.out())?,
        "sync" => cmd_sync(ctx)?,
        "add" => {
            let content = prompter.ask("content")?;
            if content.is_empty() {
                debug!("add without content, nothing to do");
                return Ok(Flow::Continue);
            }
            let new_task = NewTask {
                content,
                project: prompter.ask_optional("project")?,
                due: prompter.ask_optional("due")?,
                priority: prompter.ask_priority()?,
                labels: prompter.ask_labels()?,
            };
            cmd_add(ctx, new_task, prompter.out())?;
        }
        "update" => {
            let ids = task_ids(ctx, args, prompter)?;
            let changes = TaskChanges {
                content: prompter.ask_optional("content")?,
                due: prompter.ask_optional("due")?,
                priority: prompter.ask_priority()?,
                labels: prompter.ask_labels()?,
            };
            cmd_update(ctx, &ids, changes, prompter.out())?;
        }
        "complete" => {
            let ids = task_ids(ctx, args, prompter)?;
            cmd_complete(ctx, &ids, prompter.out())?;
        }
        "delete" => {
            let ids = task_ids(ctx, args, prompter)?;
            cmd_delete(ctx, &ids, prompter.out())?;
        }
        "comments" => {
            let ids = task_ids(ctx, args, prompter)?;
            cmd_comments(ctx, &ids, prompter.out())?;
        }
        other => debug!("ignoring unknown command '{}'", other),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mutation::{FieldChange, Mutation};
    use crate::model::priority::Priority;
    use crate::ops::session::Session;
    use crate::ops::test_helpers::*;
    use pretty_assertions::assert_eq;
    use std::io::{BufReader, Cursor, Read};

    fn context() -> Context<FakeStore> {
        let mut ctx = Context::new(Session::open(FakeStore::new(sample_snapshot())).unwrap());
        ctx.color = false;
        ctx
    }

    fn session(ctx: &mut Context<FakeStore>, input: &str) -> String {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        run_interactive(ctx, &mut input, &mut out, &Interrupt::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    /// Hands out input one byte at a time and fires `interrupt` right after
    /// the `after`-th newline.
    struct InterruptAfter {
        data: Vec<u8>,
        pos: usize,
        newlines: usize,
        after: usize,
        interrupt: Interrupt,
    }

    impl Read for InterruptAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(&byte) = self.data.get(self.pos) else {
                return Ok(0);
            };
            if buf.is_empty() {
                return Ok(0);
            }
            self.pos += 1;
            buf[0] = byte;
            if byte == b'\n' {
                self.newlines += 1;
                if self.newlines == self.after {
                    self.interrupt.trigger();
                }
            }
            Ok(1)
        }
    }

    fn interrupted_session(ctx: &mut Context<FakeStore>, input: &str, after: usize) -> String {
        let interrupt = Interrupt::default();
        let reader = InterruptAfter {
            data: input.as_bytes().to_vec(),
            pos: 0,
            newlines: 0,
            after,
            interrupt: interrupt.clone(),
        };
        let mut input = BufReader::with_capacity(1, reader);
        let mut out = Vec::new();
        run_interactive(ctx, &mut input, &mut out, &interrupt).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn words(line: &str) -> Vec<String> {
        shell_words::split(line).unwrap()
    }

    #[test]
    fn lines_split_like_a_shell() {
        assert_eq!(words("list -p  Inbox"), vec!["list", "-p", "Inbox"]);
        assert!(words("   ").is_empty());
        assert_eq!(
            words(r#"list -p "Side Projects""#),
            vec!["list", "-p", "Side Projects"]
        );
        assert_eq!(words("say 'it''s'"), vec!["say", "its"]);
        assert_eq!(words(r#"a"b c"d"#), vec!["ab cd"]);
        assert_eq!(words(r#"add """#), vec!["add", ""]);
        assert_eq!(words(r"one\ word"), vec!["one word"]);
        assert_eq!(words(r#""say \"hi\"""#), vec![r#"say "hi""#]);
        assert_eq!(words(r"'a\b'"), vec![r"a\b"]);
        assert!(shell_words::split("list -p 'Inbox").is_err());
        assert!(shell_words::split("x \"y").is_err());
    }

    #[test]
    fn list_flags() {
        assert_eq!(
            parse_list_flags(&words("-p 'Side Projects' -d tomorrow")),
            Ok(ListFlags {
                project: Some("Side Projects".into()),
                date: Some(DateFilter::Tomorrow),
            })
        );
        assert!(parse_list_flags(&words("-p")).is_err());
        assert!(parse_list_flags(&words("-d someday")).is_err());
        assert!(parse_list_flags(&words("Inbox")).is_err());
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut ctx = context();
        let out = session(&mut ctx, "quit\nprojects\n");
        assert_eq!(out, PROMPT);
    }

    #[test]
    fn end_of_input_ends_the_loop() {
        let mut ctx = context();
        let out = session(&mut ctx, "projects\n");
        assert_eq!(out, format!("{PROMPT}Inbox\nWork\n{PROMPT}\n"));
    }

    #[test]
    fn unknown_and_blank_lines_are_ignored() {
        let mut ctx = context();
        let out = session(&mut ctx, "frobnicate --hard\n\n   \nexit\n");
        assert_eq!(out, PROMPT.repeat(4));
        assert_eq!(ctx.session.store().pulls, 1);
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn errors_return_to_the_prompt() {
        let mut ctx = context();
        let out = session(&mut ctx, "list -p 'Inbox\ncomplete zz\nlist -d someday\nexit\n");
        assert_eq!(out.matches("error: ").count(), 3);
        assert_eq!(out.matches(PROMPT).count(), 4);
    }

    #[test]
    fn add_prompts_for_each_field() {
        let mut ctx = context();
        let out = session(
            &mut ctx,
            "add\nPick up parcel\nWork\ntomorrow\n7\n2\nerrand\nexit\n",
        );
        assert!(out.contains("content: project: due: priority: "));
        assert!(out.contains("priority must be between 1 and 4, got 7"));
        assert!(out.contains("labels: Pick up parcel added\n"));
        assert_eq!(
            ctx.session.store().pushed,
            vec![vec![Mutation::Add {
                content: "Pick up parcel".into(),
                project_id: Some(2),
                due: Some("tomorrow".into()),
                label_ids: Some(vec![10]),
                priority: Some(Priority::from_display(2).unwrap()),
            }]]
        );
    }

    #[test]
    fn add_with_unknown_label_is_reported() {
        let mut ctx = context();
        let out = session(&mut ctx, "add\nx\n\n\n\nnope\nexit\n");
        assert!(out.contains("error: unknown label: nope"));
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn complete_with_positional_ids() {
        let mut ctx = context();
        let out = session(&mut ctx, "complete 2a 2b\nexit\n");
        assert!(out.contains("Task \"Buy milk\" completed\nTask \"Call bank\" completed\n"));
    }

    #[test]
    fn delete_asks_for_a_task_after_listing() {
        let mut ctx = context();
        let out = session(&mut ctx, "delete\nmilk\n2c\nexit\n");
        assert!(out.contains("Inbox\n"));
        assert!(out.contains("open tasks: 2a 2b 2c"));
        assert!(out.contains("Task \"Read book\" deleted\n"));
        assert_eq!(
            ctx.session.store().pushed,
            vec![vec![Mutation::Delete { id: 0x2c }]]
        );
    }

    #[test]
    fn update_skips_empty_answers() {
        let mut ctx = context();
        let out = session(&mut ctx, "update 2b\n\nfri\n\n\nexit\n");
        assert!(out.contains("content: due: priority: labels: Task 2b updated\n"));
        assert_eq!(
            ctx.session.store().pushed,
            vec![vec![Mutation::Update {
                id: 0x2b,
                change: FieldChange::Due("fri".into()),
            }]]
        );
    }

    #[test]
    fn end_of_input_mid_prompt_stages_nothing() {
        let mut ctx = context();
        let out = session(&mut ctx, "add\nhalf a task\n");
        assert!(out.ends_with("project: \n"));
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn interrupt_during_a_prompt_drops_the_command() {
        let mut ctx = context();
        // Fires once the answer to `content:` has been read
        let out = interrupted_session(&mut ctx, "add\nPick up parcel\nprojects\nexit\n", 2);
        assert!(out.contains(&format!("content: \n{PROMPT}Inbox\nWork\n")));
        assert!(!out.contains("project: "));
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn interrupt_at_the_prompt_discards_the_line() {
        let mut ctx = context();
        let out = interrupted_session(&mut ctx, "complete 2a\nprojects\nexit\n", 1);
        assert_eq!(out, format!("{PROMPT}\n{PROMPT}Inbox\nWork\n{PROMPT}"));
        assert!(ctx.session.store().pushed.is_empty());
    }

    #[test]
    fn comments_for_given_task() {
        let mut ctx = context();
        let out = session(&mut ctx, "comments 2b\nexit\n");
        assert!(out.contains("Ask about the invoice\n"));
    }
}
