use std::fmt;
use std::str::FromStr;

/// One of the six named directions of the skybox cube. Declaration order is the order faces are
/// drawn in and the order their slots are laid out in every per-face table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    Front,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Face {
    pub const COUNT: usize = 6;

    pub const ALL: [Face; Face::COUNT] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Up,
        Face::Down,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The two letter suffix used in staged and exported file names (`sky512_ft.png`).
    pub fn suffix(self) -> &'static str {
        match self {
            Face::Front => "ft",
            Face::Back => "bk",
            Face::Left => "lf",
            Face::Right => "rt",
            Face::Up => "up",
            Face::Down => "dn",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Face> {
        Face::ALL
            .into_iter()
            .find(|face| face.suffix().eq_ignore_ascii_case(suffix))
    }

    /// Matches names like `mysky_ft.png` or `SKYBK.PNG`. The first face (in declaration order)
    /// whose suffix matches wins.
    pub fn from_file_name(name: &str) -> Option<Face> {
        let name = name.to_ascii_lowercase();
        Face::ALL
            .into_iter()
            .find(|face| name.ends_with(&format!("{}.png", face.suffix())))
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Face {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Face::from_suffix(s)
            .ok_or_else(|| format!("unknown face `{s}`, expected one of ft bk lf rt up dn"))
    }
}

/// Key for a staged image or a cached texture: one of the cube faces, or the single image that is
/// stretched around the whole sphere in stretch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Face(Face),
    Stretch,
}

impl Slot {
    pub const ALL: [Slot; Face::COUNT + 1] = [
        Slot::Face(Face::Front),
        Slot::Face(Face::Back),
        Slot::Face(Face::Left),
        Slot::Face(Face::Right),
        Slot::Face(Face::Up),
        Slot::Face(Face::Down),
        Slot::Stretch,
    ];

    /// File stem of the temporary copy for this slot.
    pub fn file_stem(self) -> &'static str {
        match self {
            Slot::Face(face) => face.suffix(),
            Slot::Stretch => "stretch",
        }
    }
}

impl From<Face> for Slot {
    fn from(face: Face) -> Self {
        Slot::Face(face)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_declaration_order() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
    }

    #[test]
    fn suffixes_round_trip() {
        for face in Face::ALL {
            assert_eq!(Face::from_suffix(face.suffix()), Some(face));
            assert_eq!(face.to_string().parse::<Face>(), Ok(face));
        }
        assert_eq!(Face::from_suffix("xx"), None);
        assert!("north".parse::<Face>().is_err());
    }

    #[test]
    fn file_names_match_case_insensitively() {
        assert_eq!(Face::from_file_name("mysky_ft.png"), Some(Face::Front));
        assert_eq!(Face::from_file_name("SKYBK.PNG"), Some(Face::Back));
        assert_eq!(Face::from_file_name("day_dn.png"), Some(Face::Down));
        assert_eq!(Face::from_file_name("day_dn.jpg"), None);
        assert_eq!(Face::from_file_name("readme.txt"), None);
    }

    #[test]
    fn slot_stems() {
        assert_eq!(Slot::from(Face::Up).file_stem(), "up");
        assert_eq!(Slot::Stretch.file_stem(), "stretch");
        for (slot, face) in Slot::ALL.iter().zip(Face::ALL) {
            assert_eq!(*slot, Slot::Face(face));
        }
        assert_eq!(Slot::ALL[Face::COUNT], Slot::Stretch);
    }
}
