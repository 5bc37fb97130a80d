use serde::{Deserialize, Serialize};

/// Second line of a timeless jewel's last explicit, as the trade API joins it
pub const CONQUERED_PREFIX: &str = "Passives in radius are Conquered by the ";

/// A concrete item as reported by the game's inventory API.
///
/// Only the fields the engine reads are modelled; everything else in the API
/// record is ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedItem {
    pub name: String,

    pub base_type: String,

    #[serde(default)]
    pub implicit_mods: Vec<String>,

    #[serde(default)]
    pub explicit_mods: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ilvl: Option<u32>,

    #[serde(default)]
    pub corrupted: bool,

    #[serde(default)]
    pub synthesised: bool,
}

impl ObservedItem {
    pub fn new(name: impl Into<String>, base_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: base_type.into(),
            ..Default::default()
        }
    }

    pub fn with_implicits<S: Into<String>>(mut self, mods: impl IntoIterator<Item = S>) -> Self {
        self.implicit_mods = mods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_explicits<S: Into<String>>(mut self, mods: impl IntoIterator<Item = S>) -> Self {
        self.explicit_mods = mods.into_iter().map(Into::into).collect();
        self
    }

    /// Split a joined "Conquered by" line off the last explicit.
    ///
    /// Timeless jewels report their seed line and conqueror line as one
    /// string separated by a line break; the reference keeps them apart.
    /// Returns whether a split happened.
    pub fn split_conquered_line(&mut self) -> bool {
        let Some(last) = self.explicit_mods.last() else {
            return false;
        };
        let Some((first, second)) = last.split_once('\n') else {
            return false;
        };
        if !second.starts_with(CONQUERED_PREFIX) {
            return false;
        }

        let first = first.strip_suffix('\r').unwrap_or(first);
        let (first, second) = (first.to_string(), second.to_string());
        self.explicit_mods.pop();
        self.explicit_mods.push(first);
        self.explicit_mods.push(second);
        true
    }

    /// Parse a single API record
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_record_parses() {
        let json = r#"{
            "verified": false,
            "w": 2, "h": 4,
            "icon": "https://web.poecdn.com/image/Art/2DItems/Weapons/TwoHandWeapons/TwoHandMaces/MarohiErqi.png",
            "name": "Marohi Erqi",
            "typeLine": "Karui Maul",
            "baseType": "Karui Maul",
            "ilvl": 71,
            "explicitMods": ["220% increased Physical Damage"],
            "frameType": 3
        }"#;
        let item = ObservedItem::from_json(json).unwrap();
        assert_eq!(item.name, "Marohi Erqi");
        assert_eq!(item.base_type, "Karui Maul");
        assert_eq!(item.ilvl, Some(71));
        assert!(item.implicit_mods.is_empty());
        assert_eq!(item.explicit_mods.len(), 1);
        assert!(!item.corrupted);
    }

    #[test]
    fn test_split_conquered_line() {
        let mut item = ObservedItem::new("Lethal Pride", "Timeless Jewel").with_explicits([
            "Commissioned 79200 coins to commemorate Akoya\nPassives in radius are Conquered by the Karui",
        ]);

        assert!(item.split_conquered_line());
        assert_eq!(
            item.explicit_mods,
            vec![
                "Commissioned 79200 coins to commemorate Akoya".to_string(),
                "Passives in radius are Conquered by the Karui".to_string(),
            ]
        );
        // already split
        assert!(!item.split_conquered_line());
    }

    #[test]
    fn test_split_crlf_joined_line() {
        let mut item = ObservedItem::new("Lethal Pride", "Timeless Jewel").with_explicits([
            "Commissioned 1 coins to commemorate Kaom\r\nPassives in radius are Conquered by the Karui",
        ]);

        assert!(item.split_conquered_line());
        assert_eq!(
            item.explicit_mods,
            vec![
                "Commissioned 1 coins to commemorate Kaom".to_string(),
                "Passives in radius are Conquered by the Karui".to_string(),
            ]
        );
    }

    #[test]
    fn test_other_multiline_mods_untouched() {
        let mut item = ObservedItem::new("Watcher's Eye", "Prismatic Jewel")
            .with_explicits(["Some mod\nSecond line of something else"]);
        assert!(!item.split_conquered_line());
        assert_eq!(item.explicit_mods.len(), 1);

        let mut empty = ObservedItem::new("Nothing", "Iron Ring");
        assert!(!empty.split_conquered_line());
    }
}
