//! Catalog characters

use serde::{Deserialize, Deserializer, Serialize};

use crate::skill::{Skill, SkillId};

/// Character identifier as stored in team lists
pub type CharacterId = u32;

/// Skills per character; unused slots hold [`Skill::empty`]
pub const SKILL_SLOTS: usize = 4;

/// A static catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Locked characters are not offered to computer opponents
    #[serde(default)]
    pub locked: bool,

    #[serde(deserialize_with = "deserialize_skill_slots")]
    skills: Vec<Skill>,
}

impl Character {
    /// Create a character, padding the skill list to four slots.
    ///
    /// Skills beyond the fourth are dropped.
    pub fn new(id: CharacterId, name: impl Into<String>, skills: Vec<Skill>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            locked: false,
            skills: pad_skills(skills),
        }
    }

    /// All four skill slots
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Skill in a slot
    pub fn skill(&self, index: usize) -> Option<&Skill> {
        self.skills.get(index)
    }

    /// Find the slot holding a skill id
    pub fn skill_index(&self, skill_id: SkillId) -> Option<usize> {
        self.skills
            .iter()
            .position(|s| s.id != 0 && s.id == skill_id)
    }
}

fn pad_skills(mut skills: Vec<Skill>) -> Vec<Skill> {
    skills.truncate(SKILL_SLOTS);
    while skills.len() < SKILL_SLOTS {
        skills.push(Skill::empty());
    }
    skills
}

fn deserialize_skill_slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Skill>, D::Error> {
    let skills = Vec::<Skill>::deserialize(deserializer)?;
    if skills.len() > SKILL_SLOTS {
        return Err(serde::de::Error::invalid_length(
            skills.len(),
            &"at most four skills",
        ));
    }
    Ok(pad_skills(skills))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::TargetMode;

    #[test]
    fn test_new_pads_skills() {
        let character = Character::new(1, "Naruto", vec![Skill::new(10, "Clone", TargetMode::OnSelf)]);
        assert_eq!(character.skills().len(), SKILL_SLOTS);
        assert_eq!(character.skill(0).unwrap().name, "Clone");
        assert!(character.skill(3).unwrap().is_empty());
        assert!(character.skill(4).is_none());
    }

    #[test]
    fn test_skill_index_ignores_empty_slots() {
        let character = Character::new(1, "Naruto", vec![Skill::new(10, "Clone", TargetMode::OnSelf)]);
        assert_eq!(character.skill_index(10), Some(0));
        assert_eq!(character.skill_index(0), None);
    }

    #[test]
    fn test_deserialize_pads_skills() {
        let json = r#"{"id": 4, "name": "Hinata", "skills": [
            {"id": 40, "name": "Byakugan", "target": "self",
             "effects": [{"type": "damage_boost", "target": "self", "amount": 10, "duration": 2}]}
        ]}"#;

        let character: Character = serde_json::from_str(json).unwrap();
        assert_eq!(character.skills().len(), SKILL_SLOTS);
        assert_eq!(character.skill_index(40), Some(0));
        assert!(!character.locked);
    }

    #[test]
    fn test_deserialize_rejects_five_skills() {
        let skill = r#"{"id": 1, "name": "S", "target": "self"}"#;
        let json = format!(
            r#"{{"id": 4, "name": "Hinata", "skills": [{s},{s},{s},{s},{s}]}}"#,
            s = skill
        );
        assert!(serde_json::from_str::<Character>(&json).is_err());
    }
}
