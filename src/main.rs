use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use readme_lens::repo::DEFAULT_BRANCH;
use readme_lens::{db, scan, RepoCoordinate};

#[derive(Parser)]
#[command(name = "readme_lens", about = "Heuristic README analysis: images, demo links, best section")]
struct Cli {
    /// SQLite database for stored analyses
    #[arg(long, global = true, env = "README_LENS_DB", default_value = db::DEFAULT_DB_PATH)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one README (markdown or saved API payload) and print JSON
    Analyze {
        path: PathBuf,
        /// owner/name or GitHub URL (default: the file's two parent directories)
        #[arg(short, long)]
        repo: Option<String>,
        /// Branch used for relative image paths
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,
        /// Also store the result in the database
        #[arg(long)]
        save: bool,
    },
    /// Analyze every <owner>/<name>/README* under a directory and store results
    Scan {
        dir: PathBuf,
        /// Max READMEs to analyze (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Branch used for relative image paths
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    /// Show totals for stored analyses
    Stats,
    /// Stored analyses overview table
    Overview {
        /// Only READMEs with a main image
        #[arg(long)]
        with_image: bool,
        /// Filter by best-section title (substring)
        #[arg(short, long)]
        section: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Print the stored analysis for one repo
    Show {
        /// owner/name or GitHub URL
        repo: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            path,
            repo,
            branch,
            save,
        } => {
            let coord = match repo {
                Some(r) => RepoCoordinate::parse(&r)?,
                None => {
                    let slug = scan::repo_from_path(&absolute(&path)?).ok_or_else(|| {
                        anyhow!("Cannot infer owner/name from {}; pass --repo", path.display())
                    })?;
                    RepoCoordinate::new(slug)
                }
            }
            .with_branch(branch);

            let file = scan::ReadmeFile { path, repo: coord };
            let row = scan::analyze_file(&file)?;
            println!("{}", serde_json::to_string_pretty(&row.result)?);

            if save {
                let conn = db::connect(&cli.db)?;
                db::init_schema(&conn)?;
                db::save_analyses(&conn, std::slice::from_ref(&row))?;
                info!("Saved analysis for {}", row.repo);
            }
            Ok(())
        }
        Commands::Scan { dir, limit, branch } => {
            let files = scan::discover(&dir, &branch, limit);
            if files.is_empty() {
                println!("No READMEs found. Expected <dir>/<owner>/<name>/README*.");
                return Ok(());
            }
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;

            println!("Analyzing {} READMEs...", files.len());
            let counts = analyze_files(&conn, &files)?;
            counts.print();
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("READMEs:       {}", s.readmes);
            println!("Main image:    {}", s.with_main_image);
            println!("Best section:  {}", s.with_best_section);
            println!("Link matches:  {}", s.matches);
            println!("Links:         {}", s.links);
            println!("Images:        {}", s.images);
            Ok(())
        }
        Commands::Overview {
            with_image,
            section,
            limit,
        } => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, with_image, section.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No analyses found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<28} | {:>6} | {:>7} | {:>6} | {:<24} | {:>5}",
                "#", "Repo", "Lines", "Matches", "Images", "Best section", "Words"
            );
            println!("{}", "-".repeat(98));

            for (i, r) in rows.iter().enumerate() {
                let title = r.best_title.as_deref().map(|t| truncate(t, 24)).unwrap_or_else(|| "-".into());
                println!(
                    "{:>3} | {:<28} | {:>6} | {:>7} | {:>6} | {:<24} | {:>5}",
                    i + 1,
                    truncate(&r.repo, 28),
                    r.line_count,
                    r.match_count,
                    r.image_count,
                    title,
                    r.best_words
                );
            }

            let with_main: Vec<_> = rows.iter().filter(|r| r.main_image.is_some()).collect();
            if !with_main.is_empty() {
                println!("\n--- Main images ---");
                for r in &with_main {
                    println!("  {}: {}", truncate(&r.repo, 28), r.main_image.as_deref().unwrap_or(""));
                }
            }

            println!("\n{} READMEs", rows.len());
            Ok(())
        }
        Commands::Show { repo } => {
            let coord = RepoCoordinate::parse(&repo)?;
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            match db::fetch_result(&conn, coord.slug())? {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => println!("No stored analysis for {}. Run 'scan' or 'analyze --save'.", coord),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

struct ScanCounts {
    readmes: usize,
    failed: usize,
    matches: usize,
    links: usize,
    images: usize,
    best_sections: usize,
}

impl ScanCounts {
    fn print(&self) {
        println!(
            "Saved {} READMEs ({} failed): {} link matches ({} links), {} images, {} best sections.",
            self.readmes, self.failed, self.matches, self.links, self.images, self.best_sections,
        );
    }
}

fn analyze_files(
    conn: &rusqlite::Connection,
    files: &[scan::ReadmeFile],
) -> anyhow::Result<ScanCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ScanCounts {
        readmes: 0,
        failed: 0,
        matches: 0,
        links: 0,
        images: 0,
        best_sections: 0,
    };

    for chunk in files.chunks(500) {
        let results: Vec<_> = chunk.par_iter().map(|f| (f, scan::analyze_file(f))).collect();

        let mut rows = Vec::with_capacity(results.len());
        for (file, res) in results {
            match res {
                Ok(row) => {
                    counts.matches += row.result.matches.len();
                    counts.links += row.result.link_count();
                    counts.images += row.result.images.len();
                    counts.best_sections += usize::from(row.result.best_section.is_some());
                    rows.push(row);
                }
                Err(e) => {
                    warn!("Failed to analyze {}: {:#}", file.path.display(), e);
                    counts.failed += 1;
                }
            }
        }

        counts.readmes += rows.len();
        db::save_analyses(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
