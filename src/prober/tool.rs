use super::{ArchiveKind, ProbeOutcome, Prober};
use crate::config::ProbeConfig;
use crate::error::{Result, ZipcrackError};
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Output substrings that mark a clean extraction. Matched against the
/// lowercased, combined stdout+stderr of the tool.
const SUCCESS_MARKERS: &[&str] = &["everything is ok", "all ok", "extraction complete", "done"];

/// Output substrings that mark a rejected password, including the CRC
/// variants 7-Zip and unrar report for AES-encrypted entries.
const WRONG_PASSWORD_MARKERS: &[&str] = &[
    "wrong password",
    "cannot open encrypted archive",
    "can not open encrypted archive",
    "password is incorrect",
    "incorrect password",
    "checksum error in the encrypted file",
    "crc failed in the encrypted file",
    "data error in encrypted file",
    "corrupt file or wrong password",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    SevenZip,
    Unrar,
    Rar,
}

impl ToolKind {
    fn executable_names(&self) -> &'static [&'static str] {
        match self {
            ToolKind::SevenZip => &["7z", "7za", "7zz"],
            ToolKind::Unrar => &["unrar"],
            ToolKind::Rar => &["rar", "WinRAR"],
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            ToolKind::SevenZip => "7z",
            ToolKind::Unrar => "unrar",
            ToolKind::Rar => "rar",
        }
    }

    /// Preference order by archive extension, mirroring the tools most
    /// reliable for each format.
    fn preference_for(kind: &ArchiveKind) -> &'static [ToolKind] {
        match kind {
            ArchiveKind::Zip => &[ToolKind::SevenZip, ToolKind::Rar],
            ArchiveKind::Rar => &[ToolKind::Unrar, ToolKind::Rar, ToolKind::SevenZip],
            ArchiveKind::Other(_) => &[ToolKind::SevenZip, ToolKind::Unrar, ToolKind::Rar],
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedTool {
    kind: ToolKind,
    exe: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
enum Classification {
    Success,
    WrongPassword,
    Unrecognized,
}

fn classify(output: &str) -> Classification {
    if SUCCESS_MARKERS.iter().any(|marker| output.contains(marker)) {
        return Classification::Success;
    }
    if WRONG_PASSWORD_MARKERS
        .iter()
        .any(|marker| output.contains(marker))
    {
        return Classification::WrongPassword;
    }
    Classification::Unrecognized
}

/// Well-known install locations searched in addition to PATH.
fn well_known_dirs() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![
            PathBuf::from(r"C:\Program Files\7-Zip"),
            PathBuf::from(r"C:\Program Files (x86)\7-Zip"),
            PathBuf::from(r"C:\Program Files\WinRAR"),
            PathBuf::from(r"C:\Program Files (x86)\WinRAR"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin"),
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/opt/homebrew/bin"),
        ]
    }
}

fn is_executable_file(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.is_file()
            && path
                .metadata()
                .map(|m| m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Locate the first of `names` under the extra dirs (highest priority),
/// PATH, and the well-known install locations.
fn find_executable(names: &[&str], extra_dirs: &[PathBuf]) -> Option<PathBuf> {
    let mut search_dirs: Vec<PathBuf> = extra_dirs.to_vec();
    if let Some(path_var) = env::var_os("PATH") {
        search_dirs.extend(env::split_paths(&path_var));
    }
    search_dirs.extend(well_known_dirs());

    for name in names {
        for dir in &search_dirs {
            let candidate = dir.join(name);
            if is_executable_file(&candidate) {
                return Some(candidate);
            }
            if cfg!(windows) {
                let candidate = dir.join(format!("{}.exe", name));
                if is_executable_file(&candidate) {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

enum RunOutput {
    Completed(String),
    TimedOut,
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buffer);
        }
        buffer
    })
}

/// Run a command, capturing combined stdout+stderr (lowercased).
/// The readers run on their own threads so a chatty tool cannot
/// deadlock on a full pipe while we poll for exit.
fn run_with_timeout(mut command: Command, timeout: Duration) -> std::io::Result<RunOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let timed_out = loop {
        match child.try_wait()? {
            Some(_) => break false,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                break true;
            }
            None => thread::sleep(Duration::from_millis(25)),
        }
    };

    if timed_out {
        return Ok(RunOutput::TimedOut);
    }

    let mut combined = stdout_reader.join().unwrap_or_default();
    combined.extend(stderr_reader.join().unwrap_or_default());
    Ok(RunOutput::Completed(
        String::from_utf8_lossy(&combined).to_lowercase(),
    ))
}

/// External-tool oracle: invokes 7z/unrar/rar as a subprocess and
/// classifies the captured output. Tools are resolved once, up front;
/// an archive kind with no installed tool is a fatal configuration
/// error before any probing begins.
pub struct ToolProber {
    archive: PathBuf,
    dest: PathBuf,
    tools: Vec<ResolvedTool>,
    timeout: Duration,
}

impl ToolProber {
    pub fn resolve(
        archive: &Path,
        dest: &Path,
        kind: &ArchiveKind,
        config: &ProbeConfig,
    ) -> Result<Self> {
        let preference = ToolKind::preference_for(kind);

        let tools: Vec<ResolvedTool> = preference
            .iter()
            .filter_map(|&tool_kind| {
                find_executable(tool_kind.executable_names(), &config.extra_tool_dirs)
                    .map(|exe| ResolvedTool {
                        kind: tool_kind,
                        exe,
                    })
            })
            .collect();

        if tools.is_empty() {
            let searched = preference
                .iter()
                .flat_map(|tool_kind| tool_kind.executable_names())
                .map(|name| name.to_string())
                .collect();
            return Err(ZipcrackError::ToolUnavailable {
                kind: kind.name().to_string(),
                searched,
            });
        }

        Ok(Self {
            archive: archive.to_path_buf(),
            dest: dest.to_path_buf(),
            tools,
            timeout: Duration::from_secs(config.timeout),
        })
    }

    fn build_command(&self, tool: &ResolvedTool, candidate: &str) -> Command {
        let mut command = Command::new(&tool.exe);
        match tool.kind {
            ToolKind::SevenZip => {
                command
                    .arg("x")
                    .arg(format!("-p{}", candidate))
                    .arg(&self.archive)
                    .arg(format!("-o{}", self.dest.display()))
                    .arg("-y");
            }
            ToolKind::Unrar | ToolKind::Rar => {
                // rar-family tools need a trailing separator to treat
                // the last argument as the destination directory.
                command
                    .arg("x")
                    .arg(format!("-p{}", candidate))
                    .arg("-y")
                    .arg("-o+")
                    .arg(&self.archive)
                    .arg(format!("{}{}", self.dest.display(), MAIN_SEPARATOR));
            }
        }
        command
    }
}

impl Prober for ToolProber {
    fn probe(&self, candidate: &str) -> ProbeOutcome {
        let mut last_ambiguous: Option<String> = None;

        for tool in &self.tools {
            let command = self.build_command(tool, candidate);

            let output = match run_with_timeout(command, self.timeout) {
                Ok(RunOutput::Completed(output)) => output,
                Ok(RunOutput::TimedOut) => {
                    last_ambiguous = Some(format!(
                        "{} timed out after {}s",
                        tool.kind.display_name(),
                        self.timeout.as_secs()
                    ));
                    continue;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // The tool vanished since resolution.
                    continue;
                }
                Err(e) => {
                    last_ambiguous =
                        Some(format!("{} failed to run: {}", tool.kind.display_name(), e));
                    continue;
                }
            };

            match classify(&output) {
                Classification::Success => return ProbeOutcome::Success,
                Classification::WrongPassword => return ProbeOutcome::WrongPassword,
                Classification::Unrecognized => {
                    last_ambiguous = Some(format!(
                        "{} output matched no known pattern:\n{}",
                        tool.kind.display_name(),
                        output
                    ));
                }
            }
        }

        match last_ambiguous {
            Some(raw) => ProbeOutcome::Ambiguous(raw),
            None => ProbeOutcome::ToolUnavailable,
        }
    }

    fn describe(&self) -> String {
        let names: Vec<&str> = self
            .tools
            .iter()
            .map(|tool| tool.kind.display_name())
            .collect();
        format!("external tools [{}]", names.join(", "))
    }
}
