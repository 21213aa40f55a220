/// Organization named in derived filenames.
pub const ORGANIZATION: &str = "Stiftelsen Skjulte Skatter Forlag";

/// Copyright used when a file carries none.
pub const DEFAULT_COPYRIGHT: &str =
    "Copyright © Stiftelsen Skjulte Skatters Forlag. All Rights Reserved.";

/// Comment used when a file carries none.
pub const DEFAULT_COMMENT: &str = "https://activechristianity.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagField {
    Title,
    Artist,
    Lyricist,
    Composer,
    Copyright,
    Comment,
}

impl TagField {
    pub const ALL: [TagField; 6] = [
        TagField::Title,
        TagField::Artist,
        TagField::Lyricist,
        TagField::Composer,
        TagField::Copyright,
        TagField::Comment,
    ];

    /// Form and lookup key.
    pub fn key(self) -> &'static str {
        match self {
            TagField::Title => "title",
            TagField::Artist => "artist",
            TagField::Lyricist => "lyricist",
            TagField::Composer => "composer",
            TagField::Copyright => "copyright",
            TagField::Comment => "comment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TagField::Title => "Title",
            TagField::Artist => "Artist",
            TagField::Lyricist => "Lyricist (Author)",
            TagField::Composer => "Composer",
            TagField::Copyright => "Copyright",
            TagField::Comment => "Comment",
        }
    }

    /// ID3v2.4 frame holding this field.
    pub fn frame_id(self) -> &'static str {
        match self {
            TagField::Title => "TIT2",
            TagField::Artist => "TPE1",
            TagField::Lyricist => "TEXT",
            TagField::Composer => "TCOM",
            TagField::Copyright => "TCOP",
            TagField::Comment => "COMM",
        }
    }
}

/// The six supported fields of one file.
/// `None` means the frame is absent; an empty string is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub lyricist: Option<String>,
    pub composer: Option<String>,
    pub copyright: Option<String>,
    pub comment: Option<String>,
}

impl TagRecord {
    /// Record for a file without any tag: only the defaulted fields are set.
    pub fn with_defaults() -> Self {
        TagRecord {
            copyright: Some(DEFAULT_COPYRIGHT.to_string()),
            comment: Some(DEFAULT_COMMENT.to_string()),
            ..Default::default()
        }
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Sets a field. Blank input clears it.
    pub fn set(&mut self, field: TagField, value: &str) {
        *self.slot_mut(field) = normalize(value);
    }

    /// Fills copyright and comment with the house defaults when empty.
    pub fn with_save_defaults(mut self) -> Self {
        if self.copyright.is_none() {
            self.copyright = Some(DEFAULT_COPYRIGHT.to_string());
        }
        if self.comment.is_none() {
            self.comment = Some(DEFAULT_COMMENT.to_string());
        }
        self
    }

    pub fn display(&self, field: TagField) -> &str {
        self.get(field).unwrap_or("")
    }

    /// Text block meant for pasting into descriptions.
    pub fn song_info(&self) -> String {
        let title = self.get(TagField::Title).unwrap_or("Untitled");
        let artist = self.get(TagField::Artist).unwrap_or("Unknown Artist");
        let lyricist = self.get(TagField::Lyricist).unwrap_or("Unknown");
        let composer = self.get(TagField::Composer).unwrap_or("Unknown");

        format!(
            "🎵: {artist} - {title}\n\
             ✍️: {lyricist}\n\
             🎼: {composer}\n\
             \n\
             Music and Lyrics © : Stiftelsen Skjulte Skatters Forlag\n\
             🔗: hiddentreasures.org"
        )
    }

    fn slot(&self, field: TagField) -> &Option<String> {
        match field {
            TagField::Title => &self.title,
            TagField::Artist => &self.artist,
            TagField::Lyricist => &self.lyricist,
            TagField::Composer => &self.composer,
            TagField::Copyright => &self.copyright,
            TagField::Comment => &self.comment,
        }
    }

    fn slot_mut(&mut self, field: TagField) -> &mut Option<String> {
        match field {
            TagField::Title => &mut self.title,
            TagField::Artist => &mut self.artist,
            TagField::Lyricist => &mut self.lyricist,
            TagField::Composer => &mut self.composer,
            TagField::Copyright => &mut self.copyright,
            TagField::Comment => &mut self.comment,
        }
    }
}

fn normalize(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
