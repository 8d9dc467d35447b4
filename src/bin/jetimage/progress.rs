/// Progress bar and statistics for `jetimage` executable
pub (super) struct Progress(Mutex<Inner>);

struct Inner {
    n_files_read: u16,
    n_records_read: u64,
    files_bar: ProgressBar,
    failed_files: Vec<PathBuf>,
}

impl Progress {

    pub (super) fn new(infiles: &[PathBuf]) -> Self {
        Self(Mutex::new(Inner {
            n_files_read: 0,
            n_records_read: 0,
            files_bar: files_bar(infiles),
            failed_files: vec![],
        }))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub (super) fn read_file_done<T>(&self, file: &Path, result: &Result<Vec<T>>) {
        let mut data = self.lock();
        data.n_files_read += 1;
        match result {
            Ok(records) => {
                data.n_records_read += records.len() as u64;
                log::debug!("{}: {} records", file.display(), records.len());
            }
            Err(e) => {
                log::error!("{}: {e}", file.display());
                data.failed_files.push(file.to_path_buf());
            }
        }
        data.files_bar.set_message(file.display().to_string());
        data.files_bar.inc(1);
    }

    pub (super) fn final_report(&self) {
        let data = self.lock();
        data.files_bar.finish_with_message("<finished processing files>");
        println!("Read {} records from {} files", group_digits(data.n_records_read), data.n_files_read);
        if !data.failed_files.is_empty() {
            let n = data.failed_files.len();
            let plural = if n == 1 { "" } else { "s" };
            println!("Warning: failed to read the following {n} file{plural}:");
            for file in data.failed_files.iter() {
                println!("  {}", file.display());
            }
        }
    }
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    path::{Path, PathBuf},
};
use indicatif::ProgressBar;
use jetimage::Result;
use jetimage::utils::{files_bar, group_digits};
