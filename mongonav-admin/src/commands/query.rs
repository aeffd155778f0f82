use anyhow::{Context, Result};
use clap::Subcommand;
use mongonav_core::{
    ConditionRow, FilterCompiler, NavigatorClient, QueryRun, QuerySession, QuerySettings,
    QuerySource, SlowQueryLogger, Target,
};
use serde_json::Value;

use super::print_documents;

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Compile conditions and print the resulting filter
    Compile {
        /// Condition as field:type:operator[:value]; repeatable
        #[arg(short = 'w', long = "where", value_name = "FIELD:TYPE:OP[:VALUE]")]
        conditions: Vec<ConditionRow>,
        /// Skip `exists` conditions that have no value
        #[arg(long)]
        require_value_for_exists: bool,
    },
    /// Compile conditions and run them against a collection
    Run {
        database: String,
        collection: String,
        /// Condition as field:type:operator[:value]; repeatable
        #[arg(short = 'w', long = "where", value_name = "FIELD:TYPE:OP[:VALUE]")]
        conditions: Vec<ConditionRow>,
        /// Skip `exists` conditions that have no value
        #[arg(long)]
        require_value_for_exists: bool,
    },
    /// Run a raw JSON filter
    Raw {
        database: String,
        collection: String,
        /// Filter document, e.g. '{"age": {"$gt": 30}}'
        filter: String,
    },
    /// Generate a filter from a natural-language prompt
    Ai {
        database: String,
        collection: String,
        prompt: String,
        /// Run the generated filter
        #[arg(long)]
        run: bool,
    },
}

pub async fn execute_query_command(
    client: &NavigatorClient,
    settings: &QuerySettings,
    command: QueryCommands,
) -> Result<()> {
    match command {
        QueryCommands::Compile {
            conditions,
            require_value_for_exists,
        } => {
            let session = session_for(client, settings, require_value_for_exists);
            warn_unsupported(&conditions);

            let filter = session.compile(&conditions);
            println!("{}", serde_json::to_string_pretty(&filter)?);
            let skipped = skipped_rows(session.compiler(), &conditions);
            if skipped > 0 {
                println!("\n{} of {} condition(s) skipped", skipped, conditions.len());
            }
        }

        QueryCommands::Run {
            database,
            collection,
            conditions,
            require_value_for_exists,
        } => {
            let session = session_for(client, settings, require_value_for_exists);
            let target = Target::new(database, collection)?;
            warn_unsupported(&conditions);

            let run = session.run_manual(&target, &conditions).await?;
            print_run(client, &run)?;
        }

        QueryCommands::Raw {
            database,
            collection,
            filter,
        } => {
            let session = session_for(client, settings, false);
            let target = Target::new(database, collection)?;
            let filter: Value = serde_json::from_str(&filter).context("Filter is not valid JSON")?;

            let run = session.execute(&target, filter, QuerySource::Manual).await?;
            print_run(client, &run)?;
        }

        QueryCommands::Ai {
            database,
            collection,
            prompt,
            run,
        } => {
            let session = session_for(client, settings, false);
            let target = Target::new(database, collection)?;

            println!("Generating query...");
            let generated = session.generate_ai(&target, &prompt).await?;
            if !generated.has_query() {
                println!("✗ The model did not return a usable query");
                return Ok(());
            }

            println!("\nGenerated Query");
            println!("{}", "=".repeat(50));
            println!("{}", serde_json::to_string_pretty(&generated.query)?);
            if !generated.source.is_empty() {
                println!("Source: {}", generated.source);
            }

            if run {
                let run = session.run_ai(&target, &generated).await?;
                print_run(client, &run)?;
            }
        }
    }

    Ok(())
}

fn session_for(client: &NavigatorClient, settings: &QuerySettings, strict: bool) -> QuerySession {
    let mut options = settings.compile_options();
    if strict {
        options = options.require_value_for_exists(true);
    }
    QuerySession::new(client.clone(), options)
}

fn warn_unsupported(conditions: &[ConditionRow]) {
    for row in conditions.iter().filter(|r| !r.is_supported()) {
        println!(
            "⚠️  '{}' is not offered for {} fields; compiling it anyway",
            row.operator, row.field_type
        );
    }
}

/// Rows left out of the filter; rows replaced by a later row on the same field are not counted
fn skipped_rows(compiler: &FilterCompiler, conditions: &[ConditionRow]) -> usize {
    conditions.iter().filter(|r| !compiler.contributes(r)).count()
}

fn print_run(client: &NavigatorClient, run: &QueryRun) -> Result<()> {
    println!("\nFilter: {}", run.filter);
    print_documents(&run.results)?;

    if let Some(logger) = client.slow_query_logger() {
        let lines = slow_query_lines(logger);
        if !lines.is_empty() {
            println!("\nSlow Queries");
            println!("{}", "-".repeat(50));
            for line in lines {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn slow_query_lines(logger: &SlowQueryLogger) -> Vec<String> {
    let stats = logger.get_stats();
    if stats.total_count == 0 {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "{} over {}ms (avg {}ms, max {}ms)",
        stats.total_count, stats.threshold_ms, stats.avg_duration_ms, stats.max_duration_ms
    )];
    for query in logger.get_slow_queries(5) {
        lines.push(format!(
            "  {}ms {}.{} {}",
            query.duration_ms, query.database, query.collection, query.query
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongonav_core::CompileOptions;
    use std::time::Duration;

    fn rows(specs: &[&str]) -> Vec<ConditionRow> {
        specs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_same_field_rows_are_not_skipped() {
        let compiler = FilterCompiler::default();
        let conditions = rows(&["status:string:equals:a", "status:string:equals:b"]);
        assert_eq!(compiler.compile(&conditions).len(), 1);
        assert_eq!(skipped_rows(&compiler, &conditions), 0);
    }

    #[test]
    fn test_skipped_rows_counts_incomplete_and_dropped() {
        let compiler = FilterCompiler::new(CompileOptions::default());
        let conditions = rows(&[
            "status:string:equals:a",
            ":string:equals:x",
            "name:string:contains",
            "age:number:greater:abc",
        ]);
        assert_eq!(skipped_rows(&compiler, &conditions), 3);
    }

    #[test]
    fn test_slow_query_lines() {
        let quiet = SlowQueryLogger::new(Duration::from_secs(60), true);
        assert!(slow_query_lines(&quiet).is_empty());

        let logger = SlowQueryLogger::new(Duration::ZERO, true);
        let tracker = logger.start_query("shop", "orders", r#"{"a":1}"#.to_string());
        logger.finish_query(tracker);

        let lines = slow_query_lines(&logger);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1 over 0ms"));
        assert!(lines[1].contains(r#"shop.orders {"a":1}"#));
    }
}
