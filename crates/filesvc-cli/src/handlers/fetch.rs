//! `filesvc fetch` - resolve keys through the shared job cache.
//!
//! Every key occurrence gets its own progress bar and `subscribers` handlers.
//! The first handler of each occurrence reports the outcome back; the others
//! only count deliveries, which makes the one-fetch-many-subscribers fan-out
//! visible in the summary.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use filesvc_core::{Bytes, FileError, RemoteFile};
use filesvc_jobs::SubscriptionHandlers;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the fetch command.
#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub keys: Vec<String>,
    pub out: Option<PathBuf>,
    pub subscribers: usize,
}

/// Outcome for one key occurrence.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub key: String,
    pub result: Result<Bytes, FileError>,
    /// Terminal callbacks delivered across all of this occurrence's subscribers.
    pub deliveries: usize,
    /// Where the payload was written, if anywhere.
    pub written_to: Option<PathBuf>,
}

/// Result of a fetch command.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
    /// Distinct download jobs used.
    pub jobs: usize,
}

impl FetchReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

type Delivery = (usize, Result<Bytes, FileError>);

fn progress_bar(key: &str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.set_message(key.to_string());
    bar
}

/// Handlers for the subscriber that reports the outcome of occurrence `index`.
fn reporting_handlers(
    index: usize,
    tx: &mpsc::UnboundedSender<Delivery>,
    bar: &ProgressBar,
    delivered: &Arc<AtomicUsize>,
) -> SubscriptionHandlers {
    let (on_progress_bar, ok_bar, err_bar) = (bar.clone(), bar.clone(), bar.clone());
    let (ok_tx, err_tx) = (tx.clone(), tx.clone());
    let (ok_count, err_count) = (Arc::clone(delivered), Arc::clone(delivered));

    SubscriptionHandlers::new()
        .on_progress(move |fraction| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            on_progress_bar.set_position((f64::from(fraction) * 100.0).round() as u64);
        })
        .on_success(move |data| {
            ok_count.fetch_add(1, Ordering::SeqCst);
            ok_bar.finish_with_message(format!("{} bytes", data.len()));
            let _ = ok_tx.send((index, Ok(data)));
        })
        .on_error(move |error| {
            err_count.fetch_add(1, Ordering::SeqCst);
            err_bar.abandon_with_message(error.diagnostic());
            let _ = err_tx.send((index, Err(error)));
        })
}

fn counting_handlers(delivered: &Arc<AtomicUsize>) -> SubscriptionHandlers {
    let (ok_count, err_count) = (Arc::clone(delivered), Arc::clone(delivered));
    SubscriptionHandlers::new()
        .on_success(move |_| {
            ok_count.fetch_add(1, Ordering::SeqCst);
        })
        .on_error(move |_| {
            err_count.fetch_add(1, Ordering::SeqCst);
        })
}

/// File name a key is saved under inside the output directory.
pub fn output_file_name(key: &str) -> String {
    let last = key
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let last = last.split(['?', '#']).next().unwrap_or_default();
    let sanitized: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "download".to_string()
    } else {
        sanitized
    }
}

/// First path in `dir` for `name` not claimed earlier in this run.
///
/// Collisions get `-1`, `-2`, ... inserted before the extension.
pub fn unique_output_path(dir: &Path, name: &str, taken: &HashSet<PathBuf>) -> PathBuf {
    let path = dir.join(name);
    if !taken.contains(&path) {
        return path;
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };
    let mut suffix = 1usize;
    loop {
        let candidate = match extension {
            Some(extension) => dir.join(format!("{stem}-{suffix}.{extension}")),
            None => dir.join(format!("{stem}-{suffix}")),
        };
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

async fn write_output(path: PathBuf, key: &str, data: &Bytes) -> Result<PathBuf, CliError> {
    tokio::fs::write(&path, data).await?;
    tracing::debug!(key, path = %path.display(), bytes = data.len(), "Wrote output");
    Ok(path)
}

/// Run the fetch command and collect a report.
///
/// Individual fetch failures are part of the report; only argument and output
/// errors are returned as `Err`.
pub async fn execute(ctx: &CliContext, args: &FetchArgs) -> Result<FetchReport, CliError> {
    if args.keys.is_empty() {
        return Err(CliError::Arguments(
            "at least one key is required".to_string(),
        ));
    }
    let subscribers = args.subscribers.max(1);
    if let Some(dir) = &args.out {
        tokio::fs::create_dir_all(dir).await?;
    }

    let bars = MultiProgress::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();
    let mut subscriptions = Vec::with_capacity(args.keys.len());
    let mut delivered = Vec::with_capacity(args.keys.len());

    for (index, key) in args.keys.iter().enumerate() {
        let job = ctx.cache.job_for_resource(RemoteFile::from_key(key.as_str()));
        let bar = bars.add(progress_bar(key));
        let count = Arc::new(AtomicUsize::new(0));

        let mut ids = Vec::with_capacity(subscribers);
        ids.push(job.subscribe(reporting_handlers(index, &tx, &bar, &count)));
        for _ in 1..subscribers {
            ids.push(job.subscribe(counting_handlers(&count)));
        }
        subscriptions.push((job, ids));
        delivered.push(count);
    }
    drop(tx);

    let mut results: Vec<Option<Result<Bytes, FileError>>> = vec![None; args.keys.len()];
    let mut pending = args.keys.len();
    while pending > 0 {
        // Reporting handlers outlive this loop inside the jobs, so the channel
        // never closes on its own.
        let Some((index, result)) = rx.recv().await else {
            break;
        };
        if results[index].is_none() {
            pending -= 1;
        }
        results[index] = Some(result);
    }

    for (job, ids) in &subscriptions {
        for id in ids {
            job.remove_subscriber(*id);
        }
    }

    // One file per distinct key; distinct keys never share a file.
    let mut written: HashSet<&str> = HashSet::new();
    let mut taken = HashSet::new();
    let mut outcomes = Vec::with_capacity(args.keys.len());
    for ((key, result), count) in args.keys.iter().zip(results).zip(&delivered) {
        let result = result.unwrap_or(Err(FileError::transport_unknown()));
        let written_to = match (&args.out, &result) {
            (Some(dir), Ok(data)) if !written.contains(key.as_str()) => {
                let path = unique_output_path(dir, &output_file_name(key), &taken);
                let path = write_output(path, key, data).await?;
                taken.insert(path.clone());
                written.insert(key.as_str());
                Some(path)
            }
            _ => None,
        };
        outcomes.push(FetchOutcome {
            key: key.clone(),
            result,
            deliveries: count.load(Ordering::SeqCst),
            written_to,
        });
    }

    Ok(FetchReport {
        outcomes,
        jobs: ctx.cache.len(),
    })
}

/// Print a one-line-per-key summary.
pub fn print_report(report: &FetchReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(data) => {
                let target = outcome
                    .written_to
                    .as_ref()
                    .map(|p| format!(" -> {}", p.display()))
                    .unwrap_or_default();
                println!(
                    "{}: {} bytes, {} deliveries{target}",
                    outcome.key,
                    data.len(),
                    outcome.deliveries
                );
            }
            Err(error) => println!("{}: {}", outcome.key, error.diagnostic()),
        }
    }
    println!(
        "{} keys, {} jobs, {} failed",
        report.outcomes.len(),
        report.jobs,
        report.failures()
    );
}
