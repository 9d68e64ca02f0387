use clap::Parser;
use tracing_subscriber::EnvFilter;

use algolearn_core::model::{
    AnswerOption, Module, ModuleId, OptionId, Question, QuestionId, Section, SectionId,
};
use storage::repository::Storage;

#[derive(Debug, Parser)]
#[command(name = "seed")]
#[command(about = "Seed a SQLite database with a sample AlgoLearn module", long_about = None)]
struct Args {
    /// SQLite URL
    #[arg(long = "db", env = "ALGOLEARN_DB_URL", default_value = "sqlite:dev.sqlite3?mode=rwc")]
    db_url: String,

    /// Module id to upsert
    #[arg(long, env = "ALGOLEARN_MODULE_ID", default_value_t = 1)]
    module_id: u64,

    /// Module title
    #[arg(long, env = "ALGOLEARN_MODULE_TITLE", default_value = "Binary Search")]
    title: String,
}

fn sample_module(id: ModuleId, title: &str) -> Result<Module, Box<dyn std::error::Error>> {
    let sections = vec![
        Section::text(
            SectionId::new(1),
            1,
            "Binary search halves a sorted range on every step.",
        ),
        Section::video(SectionId::new(2), 2, "https://videos.algolearn.dev/binary-search.mp4"),
        Section::code(
            SectionId::new(3),
            3,
            Some("rust".into()),
            "fn contains(xs: &[i32], x: i32) -> bool { xs.binary_search(&x).is_ok() }",
        ),
        Section::question(
            SectionId::new(4),
            4,
            Question::new(
                QuestionId::new(10),
                "What is the worst-case running time of binary search?",
                vec![
                    AnswerOption::new(OptionId::new(1), "O(n)", false),
                    AnswerOption::new(OptionId::new(2), "O(log n)", true),
                    AnswerOption::new(OptionId::new(3), "O(1)", false),
                ],
            ),
        ),
    ];
    Ok(Module::new(id, title, sections)?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let storage = Storage::sqlite(&args.db_url).await?;

    let module = sample_module(ModuleId::new(args.module_id), &args.title)?;
    storage.modules.upsert_module(&module).await?;
    tracing::info!(module_id = %module.id(), sections = module.sections().len(), "seeded module");

    println!(
        "Seeded module {} ({} sections) into {}",
        module.id(),
        module.sections().len(),
        args.db_url
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
