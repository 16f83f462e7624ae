//! Command rendering
//!
//! Turns a [`WorkItem`] into concrete shell command lines. Nothing here
//! spawns a process; the output is plain strings, so command shapes can be
//! checked without a benchmark binary.
//!
//! Templates use `{name}` placeholders. A name resolves against the work
//! item's parameters first, then against the builder's variables. `{{` and
//! `}}` produce literal braces.

use gridbench_core::{Error, Invocation, Platform, Result, Role, WorkItem};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Parsed command template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    /// Parse a template
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unbalanced braces or empty
    /// placeholder names.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                            Some(c) => {
                                return Err(Error::configuration(format!(
                                    "invalid character '{}' in placeholder of template '{}'",
                                    c, source
                                )))
                            }
                            None => {
                                return Err(Error::configuration(format!(
                                    "unterminated placeholder in template '{}'",
                                    source
                                )))
                            }
                        }
                    }
                    if name.is_empty() {
                        return Err(Error::configuration(format!(
                            "empty placeholder in template '{}'",
                            source
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    return Err(Error::configuration(format!(
                        "unmatched '}}' in template '{}'",
                        source
                    )))
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(CommandTemplate {
            source: source.to_string(),
            segments,
        })
    }

    /// Template text as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Render with `lookup`; substituted values are shell-quoted
    pub fn render(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = lookup(name).ok_or_else(|| {
                        Error::configuration(format!(
                            "unknown placeholder '{{{}}}' in template '{}'",
                            name, self.source
                        ))
                    })?;
                    out.push_str(&shell_quote(&value));
                }
            }
        }
        Ok(out)
    }
}

/// Quote `value` for `sh` unless it only contains safe characters
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

/// Path used to invoke a benchmark binary: bare names run from the working
/// directory
pub fn local_executable(exe: &str) -> String {
    if exe.contains('/') {
        exe.to_string()
    } else {
        format!("./{}", exe)
    }
}

/// OS timing utility prepended to timed steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWrapper {
    binary: String,
    flag: &'static str,
}

impl TimeWrapper {
    /// Wrapper for `platform` using `binary` (usually `/usr/bin/time`)
    pub fn for_platform(platform: Platform, binary: impl Into<String>) -> Self {
        TimeWrapper {
            binary: binary.into(),
            flag: platform.time_flag(),
        }
    }

    /// Wrapper for an OS name such as `std::env::consts::OS`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for OS families other than Linux and
    /// macOS.
    pub fn for_os(os: &str, binary: impl Into<String>) -> Result<Self> {
        Ok(Self::for_platform(Platform::from_os_name(os)?, binary))
    }

    /// `"<binary> <flag>"`
    pub fn prefix(&self) -> String {
        format!("{} {}", shell_quote(&self.binary), self.flag)
    }
}

/// One command of a work item
#[derive(Debug, Clone)]
pub struct Step {
    /// Role of the command
    pub role: Role,
    /// Command template
    pub template: CommandTemplate,
    /// Whether to run it under the timing utility
    pub timed: bool,
}

/// Renders work items into invocations
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    vars: BTreeMap<String, String>,
    steps: Vec<Step>,
    time: Option<TimeWrapper>,
}

impl CommandBuilder {
    /// Builder with no steps
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a substitution variable
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Append a step
    pub fn step(mut self, role: Role, template: CommandTemplate, timed: bool) -> Self {
        self.steps.push(Step {
            role,
            template,
            timed,
        });
        self
    }

    /// Set the timing utility for timed steps
    pub fn time_wrapper(mut self, wrapper: TimeWrapper) -> Self {
        self.time = Some(wrapper);
        self
    }

    /// Declared steps
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Roles of the declared steps, in order
    pub fn roles(&self) -> Vec<Role> {
        self.steps.iter().map(|s| s.role).collect()
    }

    /// Check the step list is usable
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there are no steps, a role repeats,
    /// or a timed step has no timing utility.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::configuration("no command steps declared"));
        }
        for (i, step) in self.steps.iter().enumerate() {
            if self.steps[..i].iter().any(|s| s.role == step.role) {
                return Err(Error::configuration(format!(
                    "role '{}' declared twice",
                    step.role
                )));
            }
            if step.timed && self.time.is_none() {
                return Err(Error::configuration(format!(
                    "step '{}' is timed but no timing utility is configured",
                    step.role
                )));
            }
        }
        Ok(())
    }

    /// Render one work item
    pub fn build(&self, item: &WorkItem) -> Result<Vec<Invocation>> {
        let lookup = |name: &str| {
            item.parameters
                .get(name)
                .map(|v| v.to_string())
                .or_else(|| self.vars.get(name).cloned())
        };

        let mut invocations = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let rendered = step.template.render(&lookup)?;
            let command = match (&self.time, step.timed) {
                (Some(wrapper), true) => format!("{} {}", wrapper.prefix(), rendered),
                (None, true) => {
                    return Err(Error::configuration(format!(
                        "step '{}' is timed but no timing utility is configured",
                        step.role
                    )))
                }
                (_, false) => rendered,
            };
            invocations.push(Invocation::new(item.id, step.role, command));
        }
        Ok(invocations)
    }

    /// Validate, then render every work item in order
    pub fn build_all(&self, items: &[WorkItem]) -> Result<Vec<Invocation>> {
        self.validate()?;
        let mut all = Vec::with_capacity(items.len() * self.steps.len());
        for item in items {
            all.extend(self.build(item)?);
        }
        Ok(all)
    }
}
