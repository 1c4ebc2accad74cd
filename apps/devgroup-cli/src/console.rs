//! Terminal implementation of the workflow console.

use std::io::{self, BufRead, IsTerminal, Write};

use devgroup_core::{Console, DeviceRecord, GroupCandidate};
use dialoguer::Input;

use crate::output::{device_table, group_table};

/// Checks if both stdin and stderr are connected to a terminal.
pub fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Console on the process terminal.
///
/// Prompts use dialoguer when attached to a terminal and plain line reads
/// otherwise, so answers can be piped in. Tables and notices go to stdout,
/// or to stderr when stdout carries JSON.
pub struct TerminalConsole {
    interactive: bool,
    quiet_stdout: bool,
}

impl TerminalConsole {
    pub fn new(quiet_stdout: bool) -> Self {
        Self {
            interactive: is_interactive_terminal(),
            quiet_stdout,
        }
    }

    fn emit(&self, text: &str) {
        if self.quiet_stdout {
            eprint!("{text}");
        } else {
            print!("{text}");
        }
    }

    fn read_line(&self, prompt: &str) -> io::Result<Option<String>> {
        eprint!("{prompt}: ");
        io::stderr().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl Console for TerminalConsole {
    fn show_devices(&mut self, devices: &[DeviceRecord]) {
        self.emit(&format!("\n{}\n", device_table(devices)));
    }

    fn show_groups(&mut self, groups: &[GroupCandidate]) {
        self.emit(&format!("\n{}\n", group_table(groups)));
    }

    fn notice(&mut self, message: &str) {
        self.emit(&format!("{message}\n"));
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if !self.interactive {
            return self.read_line(prompt);
        }

        match Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => Ok(Some(answer)),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(dialoguer::Error::IO(e)) => Err(e),
        }
    }
}
