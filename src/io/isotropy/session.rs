/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use failure::ResultExt;

use crate::FailResult;
use crate::parse::{parse_table, Record};

/// The line `iso` prints once it is ready for commands.
pub const BANNER: &str = "Current setting is International (new ed.) with conventional basis vectors.";

#[derive(Debug, Fail)]
pub enum IsotropyError {
    #[fail(display = "ISOTROPY bombed: {}", line)]
    Bombed { line: String },
    #[fail(display = "ISOTROPY: basis vectors are not a right-handed set")]
    BasisNotRightHanded,
    #[fail(display = "ISOTROPY: not all elements of the subgroup are elements of the parent group")]
    NotASubgroup,
    #[fail(display = "ISOTROPY exited unexpectedly")]
    Exited,
}

/// Where to find `iso`, and how to set it up.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionConfig {
    /// Directory containing `iso` and its data files.  Defaults to `$ISOLOCATION`.
    pub location: Option<PathBuf>,
    /// Arguments of `SETTING` commands.  Defaults to `INTERNATIONAL`.
    pub settings: Vec<String>,
}

impl SessionConfig {
    pub fn directory(&self) -> FailResult<PathBuf>
    {Ok({
        match self.location {
            Some(ref dir) => dir.clone(),
            None => match std::env::var_os("ISOLOCATION") {
                Some(dir) => PathBuf::from(dir),
                None => bail!("no ISOTROPY location was configured and ISOLOCATION is not set"),
            },
        }
    })}

    pub fn settings(&self) -> Vec<String>
    { match self.settings.len() {
        0 => vec!["INTERNATIONAL".to_string()],
        _ => self.settings.clone(),
    }}
}

/// An interactive ISOTROPY session.
///
/// The session remembers which `VALUE`s and `SHOW`s are in effect, and does
/// not resend commands that would not change them.  `QUIT` is sent when the
/// session is dropped.
pub struct Session<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    child: Option<Child>,
    values: BTreeMap<String, String>,
    shows: BTreeSet<String>,
}

pub type ProcessSession = Session<BufReader<ChildStdout>, ChildStdin>;

impl ProcessSession {
    /// Start `iso` as a child process.
    pub fn spawn(config: &SessionConfig) -> FailResult<Self>
    {
        let dir = config.directory()?;
        let program = dir.join("iso");
        debug!("starting ISOTROPY from {}", program.display());

        let mut child = Command::new(&program)
            .env("ISODATA", format!("{}/", dir.display()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|e| format!("could not start {}: {}", program.display(), e))?;

        let stdin = child.stdin.take().ok_or_else(|| format_err!("ISOTROPY has no stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| format_err!("ISOTROPY has no stdout"))?;
        Session::start(BufReader::new(stdout), stdin, Some(child), &config.settings())
    }
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Run the protocol over arbitrary streams.
    pub fn new(reader: R, writer: W, settings: &[String]) -> FailResult<Self>
    { Session::start(reader, writer, None, settings) }

    fn start(reader: R, writer: W, child: Option<Child>, settings: &[String]) -> FailResult<Self>
    {Ok({
        let mut session = Session {
            reader, writer, child,
            values: BTreeMap::new(),
            shows: BTreeSet::new(),
        };
        while session.read_line()? != BANNER {}

        session.command("SCREEN 999")?;
        session.command("PAGE 999")?;
        for setting in settings {
            session.command(&format!("SETTING {}", setting))?;
        }
        session
    })}

    fn read_line(&mut self) -> FailResult<String>
    {Ok({
        let mut raw = String::new();
        let count = self.reader.read_line(&mut raw).context("while reading from ISOTROPY")?;
        if count == 0 {
            return Err(IsotropyError::Exited.into());
        }
        let line = raw.trim_end_matches(|c| c == '\n' || c == '\r').to_string();
        trace!("isotropy: {}", line);
        check_line(&line)?;
        line
    })}

    /// Send a command.
    ///
    /// Every command is preceded by a prompt, which is consumed first.
    pub fn command(&mut self, command: &str) -> FailResult<()>
    {Ok({
        self.read_line()?;
        debug!("isotropy <- {}", command);
        writeln!(self.writer, "{}", command).context("while writing to ISOTROPY")?;
        self.writer.flush().context("while writing to ISOTROPY")?;
    })}

    pub fn value(&self, key: &str) -> Option<&str>
    { self.values.get(&key.to_uppercase()).map(|s| &s[..]) }

    /// Keys (upper case) and values currently in effect.
    pub fn values(&self) -> impl Iterator<Item=(&str, &str)>
    { self.values.iter().map(|(k, v)| (&k[..], &v[..])) }

    pub fn set_value(&mut self, key: &str, value: &str) -> FailResult<()>
    {Ok({
        let key = key.to_uppercase();
        if self.values.get(&key).map(|v| v == value) != Some(true) {
            self.command(&format!("VALUE {} {}", key, value))?;
            self.values.insert(key, value.to_string());
        }
    })}

    pub fn cancel_value(&mut self, key: &str) -> FailResult<()>
    {Ok({
        let key = key.to_uppercase();
        if self.values.contains_key(&key) {
            self.command(&format!("CANCEL VALUE {}", key))?;
            self.values.remove(&key);
        }
    })}

    pub fn cancel_all_values(&mut self) -> FailResult<()>
    {Ok({
        self.command("CANCEL VALUE ALL")?;
        self.values.clear();
    })}

    pub fn shows(&self) -> impl Iterator<Item=&str>
    { self.shows.iter().map(|s| &s[..]) }

    pub fn show(&mut self, item: &str) -> FailResult<()>
    {Ok({
        let item = item.to_uppercase();
        if !self.shows.contains(&item) {
            self.command(&format!("SHOW {}", item))?;
            self.shows.insert(item);
        }
    })}

    pub fn cancel_show(&mut self, item: &str) -> FailResult<()>
    {Ok({
        let item = item.to_uppercase();
        if self.shows.remove(&item) {
            self.command(&format!("CANCEL SHOW {}", item))?;
        }
    })}

    pub fn cancel_all_shows(&mut self) -> FailResult<()>
    {Ok({
        self.command("CANCEL SHOW ALL")?;
        self.shows.clear();
    })}

    /// The raw lines printed by `DISPLAY <what>`.
    pub fn display_lines(&mut self, what: &str) -> FailResult<Vec<String>>
    {Ok({
        self.command(&format!("DISPLAY {}", what))?;
        let mut lines = vec![];
        loop {
            let line = self.read_line()?;
            if ends_display(&line) {
                break;
            }
            let found = if contains_phrase(&line, "You have requested information about") {
                // irrep, data base notice, question, "Enter RETURN"
                self.skip_lines(4)?;
                self.answer_database_prompt()?
            } else if contains_phrase(&line, "Data base for these coupled subgroups") {
                self.skip_lines(2)?;
                self.answer_database_prompt()?
            } else {
                lines.push(line);
                continue;
            };
            match found {
                Some(line) => lines.push(line),
                None => {
                    debug!("no results after the data base prompt");
                    break;
                },
            }
        }
        lines
    })}

    /// Parse the output of `DISPLAY <what>` into records.
    pub fn display(&mut self, what: &str) -> FailResult<Vec<Record>>
    { Ok(parse_table(&self.display_lines(what)?)) }

    fn skip_lines(&mut self, count: usize) -> FailResult<()>
    {Ok({
        for _ in 0..count {
            self.read_line()?;
        }
    })}

    // Accept the default, then look for the first line of output.
    fn answer_database_prompt(&mut self) -> FailResult<Option<String>>
    {Ok({
        self.command("")?;
        self.read_line()?; // "Adding ..."
        for _ in 0..10 {
            let line = self.read_line()?;
            if !ends_display(&line) {
                return Ok(Some(line));
            }
        }
        None
    })}
}

impl<R: BufRead, W: Write> Drop for Session<R, W> {
    fn drop(&mut self) {
        let _ = writeln!(self.writer, "QUIT").and_then(|()| self.writer.flush());
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) => debug!("ISOTROPY exited with {}", status),
                Err(e) => warn!("could not wait for ISOTROPY: {}", e),
            }
        }
    }
}

fn ends_display(line: &str) -> bool
{ line == "*" || line.is_empty() }

// ISOTROPY wraps and pads its messages, so words are compared loosely.
fn contains_phrase(line: &str, phrase: &str) -> bool
{
    let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
    line.contains(phrase)
}

fn check_line(line: &str) -> Result<(), IsotropyError>
{
    if contains_phrase(line, "program has bombed") {
        return Err(IsotropyError::Bombed { line: line.trim().to_string() });
    }
    if contains_phrase(line, "Basis vectors are not a right-handed set") {
        return Err(IsotropyError::BasisNotRightHanded);
    }
    if contains_phrase(line, "not all elements of the subgroup are elements of parent group") {
        return Err(IsotropyError::NotASubgroup);
    }
    Ok(())
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::parse::Value;

    const STARTUP: &str = "\
ISOTROPY, Version 9.5.0, August 2018
Harold T. Stokes, Branton J. Campbell, and Dorian M. Hatch
Current setting is International (new ed.) with conventional basis vectors.
*
*
*
";

    fn international() -> Vec<String>
    { vec!["INTERNATIONAL".to_string()] }

    fn written(buf: &[u8]) -> Vec<String>
    { String::from_utf8(buf.to_vec()).unwrap().lines().map(|s| s.to_string()).collect() }

    #[test]
    fn display_protocol() {
        let transcript = format!("{}{}", STARTUP, "\
*
*
*
    k vector
GM  (0,0,0)
R   (1/2,1/2,1/2)

");
        let mut sent: Vec<u8> = vec![];
        {
            let mut session = Session::new(transcript.as_bytes(), &mut sent, &international()).unwrap();
            session.set_value("parent", "221").unwrap();
            session.show("kpoint").unwrap();
            let records = session.display("kpoint").unwrap();
            assert_eq!(records.len(), 2);
            assert_eq!(records[1].get("").and_then(Value::as_text), Some("R"));
            assert_eq!(session.value("PARENT"), Some("221"));
        }
        assert_eq!(written(&sent), vec![
            "SCREEN 999", "PAGE 999", "SETTING INTERNATIONAL",
            "VALUE PARENT 221", "SHOW KPOINT", "DISPLAY KPOINT", "QUIT",
        ]);
    }

    #[test]
    fn redundant_commands_are_suppressed() {
        let transcript = format!("{}{}", STARTUP, "*\n*\n*\n*\n*\n");
        let mut sent: Vec<u8> = vec![];
        {
            let mut session = Session::new(transcript.as_bytes(), &mut sent, &[]).unwrap();
            session.set_value("parent", "221").unwrap();
            session.set_value("PARENT", "221").unwrap();
            session.set_value("parent", "123").unwrap();
            session.show("irrep").unwrap();
            session.show("IRREP").unwrap();
            session.cancel_value("kpoint").unwrap();
            session.cancel_show("matrix").unwrap();
            session.cancel_show("irrep").unwrap();
            assert_eq!(session.shows().count(), 0);
            session.cancel_all_values().unwrap();
            assert_eq!(session.value("parent"), None);
        }
        assert_eq!(written(&sent), vec![
            "SCREEN 999", "PAGE 999",
            "VALUE PARENT 221", "VALUE PARENT 123", "SHOW IRREP",
            "CANCEL SHOW IRREP", "CANCEL VALUE ALL", "QUIT",
        ]);
    }

    #[test]
    fn database_prompt_is_answered() {
        let transcript = format!("{}{}", STARTUP, "\
*
You have requested information about IR: R4+
irrep: R4+
The data base for these irreps is not sorted.
Should this be done now?
Enter RETURN to continue
*
Adding the data base

Subgroup  Direction
140       P1

");
        let mut sent: Vec<u8> = vec![];
        {
            let mut session = Session::new(transcript.as_bytes(), &mut sent, &international()).unwrap();
            assert_eq!(session.display_lines("isotropy").unwrap(), vec![
                "Subgroup  Direction".to_string(),
                "140       P1".to_string(),
            ]);
        }
        let sent = written(&sent);
        assert_eq!(&sent[3..], &["DISPLAY ISOTROPY", "", "QUIT"]);

        // the output ends without a prompt or blank line
        let transcript = format!("{}{}", STARTUP, "\
*
Data base for these coupled subgroups is not sorted.
Should this be done now?
Enter RETURN to continue
*
Adding the data base

Subgroup  Direction
140       P1
");
        let mut sent: Vec<u8> = vec![];
        let mut session = Session::new(transcript.as_bytes(), &mut sent, &international()).unwrap();
        let err = session.display_lines("isotropy").unwrap_err();
        match err.downcast_ref::<IsotropyError>() {
            Some(IsotropyError::Exited) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn error_lines() {
        let bombed = format!("{}{}", STARTUP, "*\n  *** program has bombed ***\n");
        let mut sent: Vec<u8> = vec![];
        let mut session = Session::new(bombed.as_bytes(), &mut sent, &international()).unwrap();
        let err = session.display_lines("parent").unwrap_err();
        match err.downcast_ref::<IsotropyError>() {
            Some(IsotropyError::Bombed { line }) => assert_eq!(line, "*** program has bombed ***"),
            other => panic!("unexpected: {:?}", other),
        }

        let basis = format!("{}{}", STARTUP, "*\nBasis vectors are not a right-handed set\n");
        let mut sent: Vec<u8> = vec![];
        let mut session = Session::new(basis.as_bytes(), &mut sent, &international()).unwrap();
        let err = session.display_lines("isotropy").unwrap_err();
        match err.downcast_ref::<IsotropyError>() {
            Some(IsotropyError::BasisNotRightHanded) => {},
            other => panic!("unexpected: {:?}", other),
        }

        let subgroup = format!("{}{}", STARTUP, "*\nError: not all elements of the   subgroup are elements of parent group\n");
        let mut sent: Vec<u8> = vec![];
        let mut session = Session::new(subgroup.as_bytes(), &mut sent, &international()).unwrap();
        let err = session.display_lines("isotropy").unwrap_err();
        match err.downcast_ref::<IsotropyError>() {
            Some(IsotropyError::NotASubgroup) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_banner() {
        let mut sent: Vec<u8> = vec![];
        let err = Session::new("ISOTROPY\n".as_bytes(), &mut sent, &[]).err().unwrap();
        match err.downcast_ref::<IsotropyError>() {
            Some(IsotropyError::Exited) => {},
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(written(&sent), vec!["QUIT"]);
    }

    #[test]
    fn config_defaults() {
        let config = SessionConfig { location: Some(PathBuf::from("/opt/iso")), settings: vec![] };
        assert_eq!(config.directory().unwrap(), PathBuf::from("/opt/iso"));
        assert_eq!(config.settings(), international());
    }
}
