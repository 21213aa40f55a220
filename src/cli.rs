use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, Table};
use dialoguer::Input;

use crate::config;
use crate::core::error::TagResult;
use crate::core::{renamer, tagger};
use crate::models::{TagField, TagRecord};

#[derive(Parser)]
#[command(name = "copyrighter", about = "MP3 copyright tag editor")]
pub struct Cli {
    /// 편집할 MP3 파일
    #[arg(value_name = "FILE", required_unless_present = "web")]
    pub file: Option<PathBuf>,

    /// 웹 인터페이스로 실행
    #[arg(long, conflicts_with = "file")]
    pub web: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Edit(TagField),
    CopySongInfo,
    SaveAsNew,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<MenuChoice> {
        let choice = match input.trim() {
            "1" => MenuChoice::Edit(TagField::Title),
            "2" => MenuChoice::Edit(TagField::Artist),
            "3" => MenuChoice::Edit(TagField::Lyricist),
            "4" => MenuChoice::Edit(TagField::Composer),
            "5" => MenuChoice::Edit(TagField::Copyright),
            "6" => MenuChoice::CopySongInfo,
            "7" => MenuChoice::SaveAsNew,
            "8" => MenuChoice::Exit,
            _ => return None,
        };
        Some(choice)
    }
}

const MENU: [&str; 8] = [
    "1. Edit Title",
    "2. Edit Artist",
    "3. Edit Lyricist",
    "4. Edit Composer",
    "5. Edit Copyright",
    "6. Copy Song Info",
    "7. Save as New File",
    "8. Exit",
];

pub fn run(cli: Cli) -> Result<()> {
    if cli.web {
        let cfg = config::load_config();
        return crate::web::serve(&cfg.web);
    }

    let file = cli
        .file
        .context("Usage: copyrighter <mp3_file> or copyrighter --web")?;
    cmd_menu(&file)
}

fn cmd_menu(file: &Path) -> Result<()> {
    let mut record = tagger::read_record(file)?;

    print_banner();
    print_tags(file, &record);

    loop {
        print_menu();
        match prompt_choice()? {
            MenuChoice::Edit(field) => {
                edit_field(&mut record, field)?;
                print_tags(file, &record);
            }
            MenuChoice::CopySongInfo => print_song_info(&record),
            MenuChoice::SaveAsNew => match save_as_new(file, &mut record) {
                Ok(path) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    println!("New file created: {}", name);
                    println!("All tags have been applied to the new file.\n");
                }
                Err(e) => println!("Error creating new file: {}\n", e),
            },
            MenuChoice::Exit => {
                println!("Goodbye!");
                return Ok(());
            }
        }
    }
}

/// 저장 기본값을 채운 뒤 원본 옆에 새 파일로 기록한다. 원본은 수정하지 않는다.
fn save_as_new(file: &Path, record: &mut TagRecord) -> TagResult<PathBuf> {
    *record = std::mem::take(record).with_save_defaults();
    let output = renamer::output_path(file, record);
    tagger::write_record(record, file, &output)?;
    Ok(output)
}

fn print_banner() {
    println!("{}", "=".repeat(50));
    println!("{:^50}", "MP3 Tag Editor");
    println!("{}", "=".repeat(50));
    println!();
}

fn print_tags(file: &Path, record: &TagRecord) {
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("File: {}", filename);

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    for field in TagField::ALL {
        table.add_row(vec![
            Cell::new(field.label()),
            Cell::new(record.display(field)),
        ]);
    }
    println!("{table}\n");
}

fn print_menu() {
    println!("Choose an option:");
    for line in MENU {
        println!("{}", line);
    }
    println!();
}

fn prompt_choice() -> Result<MenuChoice> {
    let input: String = Input::new()
        .with_prompt("Enter your choice (1-8)")
        .validate_with(|s: &String| -> Result<(), &str> {
            MenuChoice::parse(s)
                .map(|_| ())
                .ok_or("Invalid choice. Please enter 1-8.")
        })
        .interact_text()?;

    MenuChoice::parse(&input).context("invalid menu choice")
}

fn edit_field(record: &mut TagRecord, field: TagField) -> Result<()> {
    let label = field.label();
    println!("Current {}: {}", label, record.display(field));

    let value: String = Input::new()
        .with_prompt(format!("Enter new {} (leave empty to remove)", label))
        .allow_empty(true)
        .interact_text()?;
    record.set(field, value.trim());

    match record.get(field) {
        Some(value) => println!("{} updated to: {}\n", label, value),
        None => println!("{} removed\n", label),
    }
    Ok(())
}

fn print_song_info(record: &TagRecord) {
    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("SONG INFO (Copy and paste this text):");
    println!("{rule}");
    println!("{}", record.song_info());
    println!("{rule}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_COMMENT, DEFAULT_COPYRIGHT};
    use tempfile::TempDir;

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Edit(TagField::Title)));
        assert_eq!(MenuChoice::parse(" 3 "), Some(MenuChoice::Edit(TagField::Lyricist)));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Edit(TagField::Copyright)));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::CopySongInfo));
        assert_eq!(MenuChoice::parse("7"), Some(MenuChoice::SaveAsNew));
        assert_eq!(MenuChoice::parse("8"), Some(MenuChoice::Exit));
    }

    #[test]
    fn test_menu_choice_rejects_out_of_range() {
        assert_eq!(MenuChoice::parse("0"), None);
        assert_eq!(MenuChoice::parse("9"), None);
        assert_eq!(MenuChoice::parse(""), None);
        assert_eq!(MenuChoice::parse("exit"), None);
    }

    #[test]
    fn test_cli_parses_file_and_web() {
        let cli = Cli::parse_from(["copyrighter", "song.mp3"]);
        assert_eq!(cli.file, Some(PathBuf::from("song.mp3")));
        assert!(!cli.web);

        let cli = Cli::parse_from(["copyrighter", "--web"]);
        assert!(cli.web);
        assert!(cli.file.is_none());

        assert!(Cli::try_parse_from(["copyrighter", "--web", "song.mp3"]).is_err());
    }

    #[test]
    fn test_cli_requires_file_without_web() {
        let err = Cli::try_parse_from(["copyrighter"]).err().unwrap();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_save_as_new_creates_copy_with_defaults() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("HV 19.mp3");
        std::fs::write(&source, [0xFF, 0xFB, 0x90, 0x64, 0, 0, 0, 0]).unwrap();

        let mut record = TagRecord::default();
        record.set(TagField::Title, "My Song");

        let output = save_as_new(&source, &mut record).unwrap();
        assert_eq!(
            output,
            dir.path().join("My Song ©️ Stiftelsen Skjulte Skatter Forlag.mp3")
        );
        assert_eq!(record.copyright.as_deref(), Some(DEFAULT_COPYRIGHT));

        let saved = tagger::read_record(&output).unwrap();
        assert_eq!(saved.title.as_deref(), Some("My Song"));
        assert_eq!(saved.comment.as_deref(), Some(DEFAULT_COMMENT));
        // source stays untagged
        assert_eq!(std::fs::read(&source).unwrap().len(), 8);
    }

    #[test]
    fn test_missing_file_fails_startup() {
        let dir = TempDir::new().unwrap();
        let err = cmd_menu(&dir.path().join("missing.mp3")).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }
}
