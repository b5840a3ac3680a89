//! JSON-lines provenance records for benchmark runs.
//!
//! A record captures enough context to interpret a measurement long after
//! the run: executable and arguments, build type, git commit, host
//! hardware, the scheduler environment, and whatever key/value outputs
//! the benchmark itself wants to attach. Records append to a `.jsonl`
//! file, one run per line.

use std::collections::HashMap;
use std::env;
use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use json::JsonValue;

/// Packages whose pinned versions are worth recording with every run.
const PINNED_PACKAGES: [&str; 5] = ["delta_stepping", "clap", "csv", "rand", "tabled"];

pub struct RunRecord {
    pub name: String,
    executable: PathBuf,
    arguments: Vec<String>,
    run_date: String,
    build_type: String,
    output: HashMap<String, String>,
    git: HashMap<String, String>,
    system: HashMap<String, String>,
    packages: HashMap<String, String>,
    slurm: HashMap<String, String>,
    sssp_env: HashMap<String, String>,
}

impl RunRecord {
    /// Builds a record named after the current executable.
    pub fn new() -> Self {
        Self::with_name(&executable_stem())
    }

    pub fn with_name(name: &str) -> Self {
        RunRecord {
            name: name.to_string(),
            executable: executable(),
            arguments: env::args().skip(1).collect(),
            run_date: run_date(),
            build_type: build_type(),
            output: HashMap::new(),
            git: git_info(),
            system: system_info(),
            packages: package_versions(),
            slurm: env_with_prefix("SLURM"),
            sssp_env: env_with_prefix("SSSP"),
        }
    }

    /// Attaches a benchmark-specific key/value pair to the record.
    pub fn insert_output(&mut self, key: &str, value: String) {
        self.output.insert(key.to_string(), value);
    }

    pub fn as_json(&self) -> JsonValue {
        json::object! {
            "name" => self.name.clone(),
            "executable" => self.executable.to_string_lossy().to_string(),
            "arguments" => self.arguments.clone(),
            "run_date" => self.run_date.clone(),
            "build_type" => self.build_type.clone(),
            "output" => self.output.clone(),
            "git" => self.git.clone(),
            "system" => self.system.clone(),
            "packages" => self.packages.clone(),
            "slurm" => self.slurm.clone(),
            "environment" => self.sssp_env.clone(),
        }
    }

    /// Prints the record to stdout, pretty with `Some(indent)`, compact
    /// single-line otherwise.
    pub fn display(&self, indent: Option<u16>) {
        match indent {
            Some(indent) => println!("{}", json::stringify_pretty(self.as_json(), indent)),
            None => println!("{}", json::stringify(self.as_json())),
        }
    }

    /// Appends the record as one line to `file`, creating parent
    /// directories and the file itself as needed.
    pub fn append(&self, file: &Path) -> io::Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = OpenOptions::new().create(true).append(true).open(file)?;
        writeln!(out, "{}", json::stringify(self.as_json()))
    }

    /// Default record path under `root`: record name plus the Slurm job
    /// id, or a timestamp outside a batch allocation.
    pub fn default_output_path(&self, root: &str) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let id = self.slurm.get("SLURM_JOB_ID").unwrap_or(&timestamp);
        PathBuf::from(format!("{root}/{}_{id}.jsonl", self.name))
    }
}

impl Default for RunRecord {
    fn default() -> Self {
        Self::new()
    }
}

fn executable() -> PathBuf {
    env::current_exe().unwrap_or_else(|_| PathBuf::from("<unknown>"))
}

fn executable_stem() -> String {
    executable()
        .file_stem()
        .unwrap_or(OsStr::new("<unknown>"))
        .to_string_lossy()
        .to_string()
}

fn run_date() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn env_with_prefix(prefix: &str) -> HashMap<String, String> {
    env::vars().filter(|(key, _)| key.starts_with(prefix)).collect()
}

/// In a standard cargo layout the executable's parent directory names the
/// profile; anything else reports as unknown.
fn build_type() -> String {
    let exe = executable();
    let parent = exe
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().to_string());
    match parent {
        Some(name) if name == "debug" || name == "release" => name,
        _ => "<unknown>".to_string(),
    }
}

fn git_command(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn git_info() -> HashMap<String, String> {
    let mut info = HashMap::new();
    if let Some(hash) = git_command(&["rev-parse", "HEAD"]) {
        info.insert("commit".to_string(), hash);
    }
    if let Some(short) = git_command(&["rev-parse", "--short", "HEAD"]) {
        info.insert("short_commit".to_string(), short);
    }
    if let Some(date) = git_command(&["log", "-1", "--format=%cd", "--date=iso"]) {
        info.insert("commit_date".to_string(), date);
    }
    info
}

fn system_info() -> HashMap<String, String> {
    let mut info = HashMap::new();
    let sys = sysinfo::System::new_all();

    if let Some(os) = sysinfo::System::name() {
        info.insert("os".to_string(), os);
    }
    if let Some(kernel) = sysinfo::System::kernel_version() {
        info.insert("kernel".to_string(), kernel);
    }
    if let Some(host) = sysinfo::System::host_name() {
        info.insert("hostname".to_string(), host);
    }

    info.insert("cpu_cores".to_string(), sys.cpus().len().to_string());
    if let Some(cpu) = sys.cpus().first() {
        info.insert("cpu_brand".to_string(), cpu.brand().to_string());
        info.insert("cpu_frequency_mhz".to_string(), cpu.frequency().to_string());
    }
    info.insert("ram_bytes".to_string(), sys.total_memory().to_string());
    info
}

/// Pins the versions of the packages in [`PINNED_PACKAGES`] from
/// `Cargo.lock`, looked up next to the manifest.
fn package_versions() -> HashMap<String, String> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut versions = HashMap::new();

    for candidate in [
        format!("{manifest_dir}/Cargo.lock"),
        format!("{manifest_dir}/../Cargo.lock"),
    ] {
        let contents = match fs::read_to_string(&candidate) {
            Ok(contents) => contents,
            Err(_) => continue,
        };
        let mut lines = contents.lines().peekable();
        while let Some(line) = lines.next() {
            let Some(raw_name) = line.trim_start().strip_prefix("name = ") else {
                continue;
            };
            let name = raw_name.trim_matches('"');
            if !PINNED_PACKAGES.contains(&name) {
                continue;
            }
            if let Some(version_line) = lines.peek() {
                if let Some(raw_version) = version_line.trim_start().strip_prefix("version = ") {
                    versions.insert(name.to_string(), raw_version.trim_matches('"').to_string());
                }
            }
        }
        if !versions.is_empty() {
            break;
        }
    }

    versions
}
