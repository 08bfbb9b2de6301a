//! Terminal input and output helpers.
//!
//! Formatting functions return strings so callers decide when to print;
//! prompt functions own the read-validate-retry loop.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::evaluation::EvaluationReport;

/// ANSI color codes, soft palette.
pub mod colors {
    pub const GREEN: &str = "\x1b[38;5;120m";
    pub const YELLOW: &str = "\x1b[38;5;228m";
    pub const RED: &str = "\x1b[38;5;210m";
    pub const CYAN: &str = "\x1b[38;5;159m";
    pub const GRAY: &str = "\x1b[38;5;250m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RESET: &str = "\x1b[0m";
}

const BAR_WIDTH: usize = 40;

pub fn banner() {
    use colors::*;
    println!();
    println!("{BOLD}{CYAN}PrepMate{RESET} {GRAY}- AI-powered mock interview practice{RESET}");
    println!();
}

pub fn section_title(text: &str) -> String {
    use colors::*;
    format!("{BOLD}{CYAN}{text}{RESET}")
}

pub fn success(text: &str) -> String {
    use colors::*;
    format!("{GREEN}✓ {text}{RESET}")
}

pub fn error(text: &str) -> String {
    use colors::*;
    format!("{RED}✗ {text}{RESET}")
}

pub fn warning(text: &str) -> String {
    use colors::*;
    format!("{YELLOW}⚠ {text}{RESET}")
}

pub fn separator(width: usize) -> String {
    use colors::*;
    format!("{GRAY}{}{RESET}", "─".repeat(width))
}

/// Reads one line from stdin, without the trailing newline.
/// Fails when stdin is closed so callers can abort cleanly.
pub fn read_line() -> Result<String> {
    let mut buf = String::new();
    let n = io::stdin().read_line(&mut buf)?;
    if n == 0 {
        bail!("input closed");
    }
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(buf)
}

pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    read_line()
}

/// Numbered menu. Returns the zero-based index of the chosen option;
/// an empty reply picks the default when one is given.
pub fn menu<S: AsRef<str>>(title: &str, options: &[S], default: Option<usize>) -> Result<usize> {
    println!();
    println!("{title}");
    for (i, option) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, option.as_ref());
    }

    loop {
        match default {
            Some(d) => print!("Choice [1-{}] (default {}): ", options.len(), d + 1),
            None => print!("Choice [1-{}]: ", options.len()),
        }
        io::stdout().flush()?;

        let input = read_line()?;
        let input = input.trim();
        if input.is_empty() {
            if let Some(d) = default {
                return Ok(d);
            }
        }
        match input.parse::<usize>() {
            Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(choice - 1),
            _ => println!(
                "{}",
                warning(&format!("Please enter a number between 1 and {}.", options.len()))
            ),
        }
    }
}

pub fn prompt_usize_in_range(prompt: &str, min: usize, max: usize, default: usize) -> Result<usize> {
    loop {
        print!("{prompt} [{min}-{max}] (default {default}): ");
        io::stdout().flush()?;

        let input = read_line()?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(default);
        }
        match input.parse::<usize>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(value),
            _ => println!(
                "{}",
                warning(&format!("Please enter a number between {min} and {max}."))
            ),
        }
    }
}

/// Reads lines until the first empty one. Returns them joined with newlines,
/// so an immediate empty line means an empty answer.
pub fn read_multiline() -> Result<String> {
    use colors::*;
    println!("{DIM}(finish with an empty line){RESET}");

    let mut lines: Vec<String> = Vec::new();
    loop {
        let line = read_line()?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

pub fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn progress_bar(current: usize, total: usize) -> String {
    use colors::*;
    let percentage = (current * 100) / total;
    let filled = (BAR_WIDTH * current) / total;
    format!(
        "[{GREEN}{}{GRAY}{}{RESET}] {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        percentage
    )
}

fn grade_color(grade: u8) -> &'static str {
    if grade >= 8 {
        colors::GREEN
    } else if grade >= 5 {
        colors::YELLOW
    } else {
        colors::RED
    }
}

/// Prints the graded transcript: the overall verdict first, then each
/// question with the answer given and its grade.
pub fn render_evaluation(
    report: &EvaluationReport,
    questions: &[String],
    answers: &[String],
    role: &str,
) {
    use colors::*;

    println!();
    println!("{}", section_title(&format!("Interview Results: {role}")));
    println!();
    println!(
        "{BOLD}Overall Grade: {}{}/10{RESET}",
        grade_color(report.overall_grade),
        report.overall_grade
    );
    println!("{}", report.overall_justification);
    println!();
    println!("{}", separator(60));

    for item in &report.evaluations {
        let question = questions
            .get(item.question_index)
            .map(String::as_str)
            .unwrap_or("");
        let answer = answers
            .get(item.question_index)
            .map(String::as_str)
            .unwrap_or("")
            .trim();

        println!();
        println!("{BOLD}Question {}: {question}{RESET}", item.question_index + 1);
        if answer.is_empty() {
            println!("  {DIM}(Not answered){RESET}");
        } else {
            for line in answer.lines() {
                println!("  {GRAY}>{RESET} {line}");
            }
        }
        println!(
            "  Grade: {}{}/10{RESET} - {}",
            grade_color(item.grade),
            item.grade,
            item.justification
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        let bar = progress_bar(2, 4);
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), BAR_WIDTH / 2);
        assert_eq!(bar.chars().filter(|&c| c == '░').count(), BAR_WIDTH / 2);
        assert!(bar.contains("50%"));
    }

    #[test]
    fn progress_bar_covers_the_extremes() {
        let empty = progress_bar(0, 5);
        assert_eq!(empty.chars().filter(|&c| c == '█').count(), 0);
        assert!(empty.contains("0%"));

        let full = progress_bar(5, 5);
        assert_eq!(full.chars().filter(|&c| c == '░').count(), 0);
        assert!(full.contains("100%"));
    }

    #[test]
    fn grades_map_to_traffic_light_colors() {
        assert_eq!(grade_color(10), colors::GREEN);
        assert_eq!(grade_color(8), colors::GREEN);
        assert_eq!(grade_color(7), colors::YELLOW);
        assert_eq!(grade_color(5), colors::YELLOW);
        assert_eq!(grade_color(4), colors::RED);
        assert_eq!(grade_color(1), colors::RED);
    }
}
