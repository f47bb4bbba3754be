//! Interactive shell front-end binary: wires C1-C10 into a runnable
//! read-eval-print loop.
//!
//! The parser, executor, job supervisor, and real completion engine are
//! external collaborators this core only reaches through the narrow
//! interfaces in §6; this binary stands in the executor's place with a
//! small command runner (`std::process::Command`) and uses
//! [`complete::complete_filesystem`] as *a* completion source, just enough
//! to drive the pager end to end.

mod complete;

use clap::Parser;
use core_actions::{DispatchOutcome, EditorDeps, EditorLoop, NaiveParser, apply_completion, highlight};
use core_color::{HighlightRole, HighlightSpec};
use core_config::{LayeredColorSource, ProcessEnvColorSource};
use core_events::{Event, InputEvent, KeyToken};
use core_history::HistoryStore;
use core_keymap::{InputCommand, Keymap};
use core_pager::{CompletionCandidate, NavDirection, Pager};
use core_prompt::{ComposedPrompt, PromptInputs, compose};
use core_render::ScreenDiffEngine;
use core_render::grid::ScreenGrid;
use core_state::Session;
use core_terminal::{CrosstermBackend, TerminalBackend, TerminalCapabilities};
use core_text::{AttributeEscapeSet, PromptLayoutCache};
use core_workers::{Generation, WorkerPool};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "brook", about = "A fish-like interactive shell front-end")]
struct Cli {
    /// Override the left prompt (defaults to a static "brook> ").
    #[arg(long)]
    prompt: Option<String>,

    /// History session name (separate shells can share or isolate history).
    #[arg(long, default_value = "default")]
    history_session: String,
}

fn init_logging() {
    let log_dir = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("brook");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::never(&log_dir, "brook.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    // Leaked intentionally: the guard must outlive the process to flush the
    // non-blocking writer, and this binary has no other owner for it.
    Box::leak(Box::new(guard));
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn char_index_of_byte(text: &str, byte: usize) -> usize {
    text.char_indices().take_while(|(b, _)| *b < byte).count()
}

/// Render one frame: compose the prompt, lay the command line and its
/// highlights into a [`ScreenGrid`], and append the pager grid (if a pager
/// is active) below it.
fn build_desired_grid(
    editor: &EditorLoop,
    width: usize,
    left_prompt: &str,
    prompt_cache: &mut PromptLayoutCache,
    attrs: &AttributeEscapeSet,
) -> ScreenGrid {
    let session = editor.session();
    let text = session.line().text();
    let cursor = session.line().cursor();
    let autosuggestion = session.autosuggestion().unwrap_or("");
    let suggestion_tail = autosuggestion.strip_prefix(text).unwrap_or("");

    let inputs = PromptInputs {
        left: left_prompt,
        right: "",
        command: text,
        autosuggestion: suggestion_tail,
        width,
    };
    let composed: ComposedPrompt = compose(&inputs, attrs, prompt_cache);

    let mut grid = ScreenGrid::new(width);
    let prompt_width = composed.left.max_line_width;
    grid.append_str(&composed.left.text, HighlightSpec::normal(), 0, prompt_width);

    let chars: Vec<char> = text.chars().collect();
    let cursor_char_idx = char_index_of_byte(text, cursor);
    let highlights = session.highlights();
    let mut cursor_pos = grid.cursor;
    for (idx, c) in chars.iter().enumerate() {
        if idx == cursor_char_idx {
            cursor_pos = grid.cursor;
        }
        let spec = highlights.get(idx).copied().unwrap_or(HighlightSpec::normal());
        grid.append(*c, spec, 0, prompt_width);
    }
    if cursor_char_idx == chars.len() {
        cursor_pos = grid.cursor;
    }

    if let Some(suggestion) = &composed.autosuggestion {
        grid.append_str(suggestion, HighlightSpec::new(HighlightRole::Autosuggestion), 0, prompt_width);
    }

    if let Some(pager) = editor.pager() {
        render_pager(&mut grid, pager);
    }

    grid.set_cursor(cursor_pos.0, cursor_pos.1);
    grid
}

fn render_pager(grid: &mut ScreenGrid, pager: &Pager) {
    let entries = pager.entries();
    let grid_layout = pager.grid();
    let disclosure = pager.disclosure();
    grid.append('\n', HighlightSpec::normal(), 0, 0);

    if pager.is_searching() {
        grid.append_str(
            &format!("search: {}", pager.search_needle()),
            HighlightSpec::new(HighlightRole::PagerPrefix),
            0,
            0,
        );
        grid.append('\n', HighlightSpec::normal(), 0, 0);
    }

    let visible_rows = disclosure.visible_rows.min(grid_layout.rows.saturating_sub(disclosure.start_row));
    for row_offset in 0..visible_rows {
        let row = disclosure.start_row + row_offset;
        for col in 0..grid_layout.columns {
            let idx = core_pager::index_of(grid_layout, row, col);
            let Some(entry) = entries.get(idx) else {
                continue;
            };
            let selected = pager.selected_index() == Some(idx);
            let completion_role = if selected {
                HighlightRole::PagerSelectedCompletion
            } else {
                HighlightRole::PagerCompletion
            };
            let desc_role = if selected {
                HighlightRole::PagerSelectedDescription
            } else {
                HighlightRole::PagerDescription
            };
            let completion_text = entry.completions.join(", ");
            grid.append_str(&completion_text, HighlightSpec::new(completion_role), 0, 0);
            let col_width = grid_layout.column_widths.get(col).copied().unwrap_or(entry.completion_width);
            for _ in entry.completion_width..col_width {
                grid.append(' ', HighlightSpec::new(completion_role), 0, 0);
            }
            if !entry.description.is_empty() {
                grid.append_str(&format!("  ({})", entry.description), HighlightSpec::new(desc_role), 0, 0);
            }
            grid.append_str("  ", HighlightSpec::normal(), 0, 0);
        }
        grid.append('\n', HighlightSpec::normal(), 0, 0);
    }
    if !disclosure.fully_disclosed {
        let remaining = grid_layout.rows.saturating_sub(disclosure.start_row + visible_rows);
        if remaining > 0 {
            grid.append_str(
                &format!("...and {remaining} more rows"),
                HighlightSpec::new(HighlightRole::PagerProgress),
                0,
                0,
            );
        }
    }
}

/// Offload highlight + autosuggestion recomputation to C9 against an
/// immutable snapshot of the current line and a recent history slice.
fn submit_background_jobs(
    highlight_pool: &WorkerPool<Vec<HighlightSpec>>,
    suggest_pool: &WorkerPool<Option<String>>,
    generation: u64,
    text: String,
    history_snapshot: Arc<Vec<String>>,
) {
    let highlight_text = text.clone();
    highlight_pool.submit(generation, move || highlight(&highlight_text));

    suggest_pool.submit(generation, move || {
        if text.is_empty() || text.ends_with(char::is_whitespace) {
            return None;
        }
        history_snapshot.iter().find(|item| item.starts_with(&text) && item.len() > text.len()).cloned()
    });
}

/// Resolve a completion candidate's applied (text, cursor) without holding
/// a pager borrow across the session mutation, then splice it in.
fn apply_pager_selection(editor: &mut EditorLoop, attrs: &AttributeEscapeSet, width: usize, max_rows: usize, dir: NavDirection) {
    let _ = (attrs, width, max_rows);
    let candidate = {
        let Some(pager) = editor.pager_mut() else {
            return;
        };
        pager.navigate(dir);
        pager.selected().map(|e| CompletionCandidate::new(e.completions.first().cloned().unwrap_or_default(), e.description.clone(), e.flags))
    };
    let Some(candidate) = candidate else {
        return;
    };
    let text = editor.session().line().text().to_string();
    let cursor = editor.session().line().cursor();
    let applied = apply_completion(&text, cursor, &candidate, false);
    editor.session_mut().edit(|line| {
        let len = line.len();
        line.delete_range(0, len);
        line.insert_string(&applied.text, 0, applied.text.len());
        line.set_cursor(applied.cursor);
    });
}

fn open_completion_pager(editor: &mut EditorLoop, attrs: &AttributeEscapeSet, width: usize, max_rows: usize) {
    let text = editor.session().line().text().to_string();
    let cursor = editor.session().line().cursor();
    let candidates = complete::complete_filesystem(&text, cursor);
    if candidates.is_empty() {
        return;
    }
    let prefix = complete::token_prefix(&text, cursor);
    let pager = Pager::new(&candidates, prefix, attrs, width, max_rows);
    editor.open_pager(pager);
}

#[allow(clippy::too_many_arguments)]
fn handle_resolved_command(
    editor: &mut EditorLoop,
    cmd: InputCommand,
    deps: &mut EditorDeps,
    attrs: &AttributeEscapeSet,
    width: usize,
    max_rows: usize,
) -> DispatchOutcome {
    if matches!(cmd, InputCommand::Complete | InputCommand::CompleteAndSearch) && editor.pager().is_none() {
        open_completion_pager(editor, attrs, width, max_rows);
        return editor.dispatch(cmd, deps);
    }

    if editor.pager().is_some() {
        let nav = match cmd {
            InputCommand::UpLine => Some(NavDirection::North),
            InputCommand::DownLine => Some(NavDirection::South),
            InputCommand::ForwardChar => Some(NavDirection::East),
            InputCommand::BackwardChar => Some(NavDirection::West),
            _ => None,
        };
        if let Some(dir) = nav {
            apply_pager_selection(editor, attrs, width, max_rows, dir);
            return DispatchOutcome::Continue;
        }
    }

    editor.dispatch(cmd, deps)
}

fn run_command(text: &str) {
    if text.trim().is_empty() {
        return;
    }
    match std::process::Command::new("/bin/sh").arg("-c").arg(text).status() {
        Ok(_status) => {}
        Err(err) => {
            warn!(%err, "failed to spawn command");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = core_config::load_from(None).unwrap_or_default();

    let history_path = config
        .history_path_override()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| core_history::default_history_path(&cli.history_session));
    let mut history = HistoryStore::open(cli.history_session.clone(), history_path).unwrap_or_else(|err| {
        warn!(%err, "failed to open history store, starting with an empty in-memory history");
        let fallback_path = std::env::temp_dir().join(format!("brook-fallback-history-{}", std::process::id()));
        HistoryStore::open("fallback", fallback_path).expect("temp dir history must open")
    });
    let _ = history.incorporate_external_changes();

    let caps = TerminalCapabilities::detect();
    let attrs = caps.attribute_escape_set();
    let (initial_width, _initial_height) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut width = initial_width as usize;

    let mut backend = CrosstermBackend::new();
    backend.enter()?;

    let env_source = ProcessEnvColorSource;
    let color_env = LayeredColorSource {
        primary: &config,
        secondary: &env_source,
    };
    let mut engine = ScreenDiffEngine::new(&color_env, caps.clone(), width);

    let generation = Generation::new();
    let highlight_pool: WorkerPool<Vec<HighlightSpec>> = WorkerPool::new(2, generation.clone());
    let suggest_pool: WorkerPool<Option<String>> = WorkerPool::new(1, generation.clone());

    let session = Session::new(generation.clone());
    let mut editor = EditorLoop::new(session);
    let keymap = Keymap::defaults();
    let parser = NaiveParser;
    let mut prompt_cache = PromptLayoutCache::default();
    let max_rows = config.pager_max_rows();

    let left_prompt = cli.prompt.unwrap_or_else(|| "brook> ".to_string());

    let (tx, mut rx) = mpsc::channel::<Event>(core_events::EVENT_CHANNEL_CAP);
    let (_input_handle, input_shutdown) = core_input::spawn_async_input(tx.clone());

    loop {
        let Some(event) = rx.recv().await else {
            break;
        };

        let mut deps = EditorDeps {
            history: &mut history,
            config: &config,
            parser: &parser,
        };

        let outcome = match event {
            Event::Input(InputEvent::Resize(w, _h)) => {
                width = w as usize;
                engine.resize(width);
                DispatchOutcome::Continue
            }
            Event::Input(InputEvent::CtrlC) => editor.dispatch(InputCommand::Cancel, &mut deps),
            Event::Input(InputEvent::KeyPress(key)) => {
                if let Some(cmd) = keymap.resolve(&key.token) {
                    handle_resolved_command(&mut editor, cmd, &mut deps, &attrs, width, max_rows)
                } else if let KeyToken::Char(c) = key.token
                    && !c.is_control()
                {
                    editor.insert_char(c, &deps);
                    DispatchOutcome::Continue
                } else {
                    debug!(token = ?key.token, "unrecognized input command");
                    DispatchOutcome::Continue
                }
            }
            Event::Input(InputEvent::PasteStart) | Event::Input(InputEvent::PasteEnd) => DispatchOutcome::Continue,
            Event::Input(InputEvent::PasteChunk(chunk)) => {
                for c in chunk.chars() {
                    editor.insert_char(c, &deps);
                }
                DispatchOutcome::Continue
            }
            Event::Shutdown => DispatchOutcome::Exit,
            _ => DispatchOutcome::Continue,
        };

        drop(deps);

        if matches!(outcome, DispatchOutcome::Exit) {
            input_shutdown.signal();
            break;
        }

        for result in highlight_pool.try_drain_fresh() {
            editor.session_mut().apply_highlights(result.generation, result.value);
        }
        for result in suggest_pool.try_drain_fresh() {
            if result.generation == generation.current() {
                editor.session_mut().set_autosuggestion(result.value);
            }
        }

        let gen_now = generation.current();
        let text_now = editor.session().line().text().to_string();
        if !text_now.is_empty() {
            let history_snapshot: Arc<Vec<String>> =
                Arc::new((1..=history.len()).filter_map(|i| history.item_at_index(i).map(|it| it.content.clone())).collect());
            submit_background_jobs(&highlight_pool, &suggest_pool, gen_now, text_now, history_snapshot);
        }

        if editor.take_repaint() {
            let grid = build_desired_grid(&editor, width, &left_prompt, &mut prompt_cache, &attrs);
            if let Err(err) = engine.update(&grid) {
                warn!(%err, "render engine reported a fatal terminal error");
                input_shutdown.signal();
                break;
            }
        }

        if let DispatchOutcome::Finished(command_text) = outcome {
            backend.leave()?;
            run_command(&command_text);
            backend.enter()?;
            engine.force_repaint();
            editor.session_mut().edit(|line| {
                let len = line.len();
                line.delete_range(0, len);
            });
        }
    }

    let _ = history.save();
    backend.leave()?;
    Ok(())
}
