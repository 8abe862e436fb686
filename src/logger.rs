use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Run log: timestamped lines in an optional log file, progress steps on stdout
pub struct Logger {
    writer: Option<BufWriter<File>>,
}

impl Logger {
    pub fn new(file: File) -> Self {
        Self {
            writer: Some(BufWriter::new(file)),
        }
    }

    /// Create (truncate) the log file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }

    /// Logger without a log file; only progress steps reach stdout
    pub fn console() -> Self {
        Self { writer: None }
    }

    /// Record detailed log information
    pub fn log(&mut self, message: &str) -> std::io::Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(writer, "[{}] {}", timestamp, message)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Record a failed run. Best effort: a log write error must not hide `err`.
    pub fn log_failure(&mut self, context: &str, err: &dyn std::fmt::Display) {
        if let Err(e) = self.log(&format!("{} failed: {}", context, err)) {
            eprintln!("[Warning] Could not write log: {}", e);
        }
    }

    /// Print a progress step and record it
    pub fn step(&mut self, message: &str) -> std::io::Result<()> {
        println!("{}", message);
        self.log(message)
    }
}

/// Format elapsed time as "xx h xx m xx.xxx s"
pub fn format_time_used(elapsed: std::time::Duration) -> String {
    let total_secs = elapsed.as_secs_f64();
    let hours = (total_secs / 3600.0) as u64;
    let minutes = ((total_secs % 3600.0) / 60.0) as u64;
    let seconds = total_secs % 60.0;

    if hours > 0 {
        format!("{:02} h {:02} m {:06.3} s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{:02} m {:06.3} s", minutes, seconds)
    } else {
        format!("{:.3} s", seconds)
    }
}
