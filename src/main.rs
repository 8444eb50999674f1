use anyhow::Result;
use dmetl::{init_tracing_once, JobArgs, NormalizeJob};

fn main() -> Result<()> {
    init_tracing_once();

    let argv: Vec<String> = std::env::args().collect();
    let args = JobArgs::resolve(&argv)?;

    let outcome = NormalizeJob::from_args(&args).run()?;
    println!("{}", outcome.stdout_line()?);
    Ok(())
}
