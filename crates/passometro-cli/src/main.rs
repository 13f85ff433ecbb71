use clap::{Parser, Subcommand};
use passometro_codec::{condutas, highlight, problems, OrphanPolicy, TaggedItem};
use passometro_core::config::data_dir_from_env_value;
use passometro_core::text::segments_text;
use passometro_core::{HandoffView, JsonStore, TextRenderer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "passometro")]
#[command(about = "ICU shift-handoff sheet tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored handoff sheet as text
    Render {
        /// Store directory (defaults to PASSOMETRO_DATA_DIR, then passometro_data)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Work with the problem-list encoding
    Problems {
        #[command(subcommand)]
        action: ProblemsAction,
    },
    /// Show how Condutas text is laid out in the grid
    Condutas {
        /// Lines separated by newline or `|`
        text: String,
    },
    /// Highlight a tagged item given as JSON (`{"texto": ..., "destaques": {...}}`)
    Highlight {
        item: String,
    },
}

#[derive(Subcommand)]
enum ProblemsAction {
    /// Print the blocks of an encoded list
    Decode { text: String },
    /// Turn an encoded list into edit text
    Expand { text: String },
    /// Turn edit text back into an encoded list
    Collapse {
        text: String,
        /// Keep `>` lines with no statement above as statements of their own
        #[arg(long)]
        promote_orphans: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render { data_dir }) => {
            let dir = data_dir.unwrap_or_else(|| {
                data_dir_from_env_value(std::env::var("PASSOMETRO_DATA_DIR").ok())
            });
            print!("{}", render_store(JsonStore::new(dir))?);
        }
        Some(Commands::Problems { action }) => match action {
            ProblemsAction::Decode { text } => println!("{}", decode_problems(&text)),
            ProblemsAction::Expand { text } => println!("{}", problems::to_edit_text(&text)),
            ProblemsAction::Collapse {
                text,
                promote_orphans,
            } => {
                let policy = if promote_orphans {
                    OrphanPolicy::Promote
                } else {
                    OrphanPolicy::Drop
                };
                let collapsed = problems::collapse_with(&text, policy);
                for orphan in &collapsed.orphans {
                    eprintln!("dropped line without a statement above it: {}", orphan);
                }
                println!("{}", collapsed.encoded);
            }
        },
        Some(Commands::Condutas { text }) => print!("{}", describe_grid(&text)),
        Some(Commands::Highlight { item }) => {
            let item: TaggedItem = serde_json::from_str(&item)?;
            println!("{}", segments_text(&highlight::highlight(&item)));
        }
        None => {
            println!("Use 'passometro --help' for commands");
        }
    }

    Ok(())
}

fn render_store(store: JsonStore) -> Result<String, Box<dyn std::error::Error>> {
    let view = HandoffView::new(store.load_handoff()?);
    Ok(TextRenderer::new().render_sheet(&view.render()))
}

fn decode_problems(text: &str) -> String {
    problems::decode(text)
        .iter()
        .map(|block| {
            let mut out = format!("- {}", block.principal);
            for sub_item in &block.sub_items {
                out.push_str(&format!("\n    - {}", sub_item));
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_grid(text: &str) -> String {
    let grid = condutas::layout(text);
    let mut out = String::new();
    for (i, column) in grid.visible_columns().enumerate() {
        out.push_str(&format!("Column {}:\n", i + 1));
        for line in column {
            out.push_str(&format!("  {}\n", line));
        }
    }
    if grid.hidden > 0 {
        out.push_str(&format!("Not shown: {}\n", grid.hidden));
    }
    out
}
