use crate::argument::Argument;
use crate::command::Command;
use crate::interface::Interface;

pub const DEFAULT_NEWLINE: &str = "\n";

const DEFAULT_WIDTH: usize = 74;
const DEFAULT_LEFT_PAD: usize = 4;
const DEFAULT_DESC_PAD: usize = 4;
const USAGE_PREFIX: &str = "Usage: ";
const OPTIONS_HEADER: &str = "# OPTIONS:";
const ARGUMENTS_HEADER: &str = "# ARGUMENTS:";

/// `HelpFormatter` renders the manual page of an [`Interface`].
///
/// The output format is like:
/// ```txt
/// Usage: <name> [command] [arguments]
///
/// [about]
///
/// # OPTIONS:
///
///     <command> [VALUE_TYPE]
///         <help> (Requires --<flag>, --<flag>)
///
/// # ARGUMENTS:
///
///     -<short>, --<long>   [VALUE_TYPE]
///         <help> (Default is '<value>')
///     --<long>
///         <help> (Required)
/// ```
///
/// Lines longer than the width are wrapped and indented under the help text.
pub struct HelpFormatter {
    width: usize,
    left_pad: usize,
    desc_pad: usize,
    newline: String,
}

impl Default for HelpFormatter {
    fn default() -> Self {
        HelpFormatter::new()
    }
}

impl HelpFormatter {
    pub fn new() -> HelpFormatter {
        HelpFormatter {
            width: DEFAULT_WIDTH,
            left_pad: DEFAULT_LEFT_PAD,
            desc_pad: DEFAULT_DESC_PAD,
            newline: DEFAULT_NEWLINE.to_string(),
        }
    }

    /// Get the max width of the output message.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get number of padding space before a command or argument.
    pub fn left_padding(&self) -> usize {
        self.left_pad
    }

    /// Get number of extra padding space before the help text.
    pub fn desc_padding(&self) -> usize {
        self.desc_pad
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    /// Set the maximum width of the manual, which defaults to 74.
    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(2);
    }

    pub fn set_left_padding(&mut self, padding: usize) {
        self.left_pad = padding;
    }

    pub fn set_desc_padding(&mut self, padding: usize) {
        self.desc_pad = padding;
    }

    pub fn set_newline(&mut self, newline: &str) {
        self.newline = newline.to_string();
    }

    /// Render the manual page of `cli`.
    ///
    /// # Example
    ///
    /// ```
    /// use clikit::{Argument, HelpFormatter, Interface};
    ///
    /// let mut cli = Interface::builder("ls").build();
    /// let _ = cli.add_argument(Argument::flag("all").short("a").help("show hidden entries")).unwrap();
    ///
    /// let manual = HelpFormatter::default().render(&cli);
    /// assert!(manual.starts_with("Usage: ls [arguments]"));
    /// assert!(manual.contains("-a, --all"));
    /// ```
    pub fn render(&self, cli: &Interface) -> String {
        let mut buff = String::new();

        let mut usage = format!("{}{}", USAGE_PREFIX, cli.name());
        if !cli.commands().is_empty() {
            usage.push_str(" [command]");
        }
        if !cli.arguments().is_empty() {
            usage.push_str(" [arguments]");
        }
        self.render_wrapped_text(&mut buff, USAGE_PREFIX.len(), &usage);

        if let Some(about) = cli.about().filter(|a| !a.is_empty()) {
            buff.push_str(&self.newline);
            buff.push_str(&self.newline);
            self.render_wrapped_text_block(&mut buff, 0, about);
        }

        if !cli.commands().is_empty() {
            self.render_header(&mut buff, OPTIONS_HEADER);
            for command in cli.commands() {
                buff.push_str(&self.newline);
                self.render_command(&mut buff, cli, command);
            }
        }

        if !cli.arguments().is_empty() {
            self.render_header(&mut buff, ARGUMENTS_HEADER);
            for argument in cli.arguments() {
                buff.push_str(&self.newline);
                self.render_argument(&mut buff, argument);
            }
        }

        buff
    }

    fn render_header(&self, buff: &mut String, header: &str) {
        buff.push_str(&self.newline);
        buff.push_str(&self.newline);
        buff.push_str(header);
        buff.push_str(&self.newline);
    }

    fn render_command(&self, buff: &mut String, cli: &Interface, command: &Command) {
        let mut head = command.name().to_owned();
        if let Some(value_type) = command.value_type() {
            head.push(' ');
            head.push_str(&value_type);
        }

        let mut notes = vec![];
        if let Some(required) = command.required_arguments() {
            let flags: Vec<&str> = required
                .iter()
                .filter_map(|id| cli.argument(id))
                .map(|argument| argument.long_flag())
                .collect();
            notes.push(format!("(Requires {})", flags.join(", ")));
        }

        self.render_entry(buff, &head, command.help(), &notes);
    }

    fn render_argument(&self, buff: &mut String, argument: &Argument) {
        let mut head = match argument.short_flag() {
            Some(short_flag) => format!("{}, {}", short_flag, argument.long_flag()),
            None => argument.long_flag().to_owned(),
        };
        if let Some(value_type) = argument.value_type() {
            if value_type.contains(' ') {
                head.push_str(&format!("   [{value_type}]"));
            } else {
                head.push_str(&format!("   {value_type}"));
            }
        }

        let mut notes = vec![];
        if let Some(default) = argument.default_value() {
            notes.push(format!("(Default is '{default}')"));
        } else if argument.is_required() {
            notes.push("(Required)".to_string());
        }

        self.render_entry(buff, &head, argument.help(), &notes);
    }

    /// Head line, then the help on the next line. Notes follow the help, or the head when
    /// there is no help.
    fn render_entry(&self, buff: &mut String, head: &str, help: Option<&str>, notes: &[String]) {
        let desc_tab = self.left_pad + self.desc_pad;
        let mut line = format!("{}{}", create_padding(self.left_pad), head);

        match help.filter(|h| !h.is_empty()) {
            Some(help) => {
                self.render_wrapped_text(buff, desc_tab, &line);
                buff.push_str(&self.newline);
                line = format!("{}{}", create_padding(desc_tab), help);
            }
            None if notes.is_empty() => {
                self.render_wrapped_text(buff, desc_tab, &line);
                return;
            }
            None => {}
        }

        for note in notes {
            line.push(' ');
            line.push_str(note);
        }
        self.render_wrapped_text(buff, desc_tab, &line);
    }

    /// Render `text` to the `buff`, wrapped at the width. Continuation lines are indented by
    /// `next_line_tab_stop` spaces.
    fn render_wrapped_text(&self, buff: &mut String, next_line_tab_stop: usize, text: &str) {
        let Some(mut pos) = self.next_wrap_pos(text) else {
            buff.push_str(text.trim_end());
            return;
        };
        buff.push_str(text[..pos].trim_end());
        buff.push_str(&self.newline);

        let tab_stop = if next_line_tab_stop >= self.width || next_line_tab_stop == 0 {
            1
        } else {
            next_line_tab_stop
        };
        let padding = create_padding(tab_stop);

        let mut processing_text = text.to_owned();
        loop {
            processing_text = format!("{}{}", padding, processing_text[pos..].trim());
            match self.next_wrap_pos(&processing_text) {
                None => {
                    buff.push_str(processing_text.trim_end());
                    return;
                }
                Some(next) => pos = next,
            }
            buff.push_str(processing_text[..pos].trim_end());
            buff.push_str(&self.newline);
        }
    }

    /// Render a text block to the `buffer`, each line wrapped on its own.
    pub fn render_wrapped_text_block(&self, buffer: &mut String, next_line_tab_stop: usize, text: &str) {
        for (i, line) in text.lines().enumerate() {
            if i != 0 {
                buffer.push_str(&self.newline);
            }
            self.render_wrapped_text(buffer, next_line_tab_stop, line);
        }
    }

    /// Like [`find_wrap_pos`], but never breaks inside the leading indentation so every
    /// wrapped line makes progress.
    fn next_wrap_pos(&self, text: &str) -> Option<usize> {
        let indent = text.len() - text.trim_start().len();
        let pos = find_wrap_pos(text, self.width, 0)?;
        if pos > indent {
            return Some(pos);
        }

        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .filter(|i| *i > indent)
            .collect();
        let hard = boundaries
            .iter()
            .copied()
            .take_while(|i| *i <= self.width)
            .last()
            .or_else(|| boundaries.first().copied())
            .unwrap_or(text.len());
        Some(hard)
    }
}

fn create_padding(len: usize) -> String {
    " ".repeat(len)
}

/// Position to break `text` so the part before it fits into `width`, or `None` when the rest
/// of the text fits already.
fn find_wrap_pos(text: &str, width: usize, start_pos: usize) -> Option<usize> {
    let rest = &text[start_pos..];

    if let Some(pos) = rest.find('\n').filter(|pos| *pos <= width) {
        return Some(pos + start_pos + 1);
    }
    if let Some(pos) = rest.find('\t').filter(|pos| *pos <= width) {
        return Some(pos + start_pos + 1);
    }
    if start_pos + width >= text.len() {
        return None;
    }

    let bytes = text.as_bytes();
    let space = (start_pos..=start_pos + width)
        .rev()
        .find(|i| matches!(bytes[*i], b' ' | b'\r' | b'\n'));
    if let Some(pos) = space.filter(|pos| *pos > start_pos) {
        return Some(pos);
    }

    (start_pos + 1..=start_pos + width)
        .rev()
        .find(|i| text.is_char_boundary(*i))
}
