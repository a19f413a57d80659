//! Built-in mission catalog and leaderboard.
//!
//! These guarantee the app is useful even without external config. The data
//! mirrors the training content the frontend ships with.

use crate::domain::{
  Agent, ContentBlock, MatchingItem, Mission, MissionCategory, MissionStatus, Stage,
};

/// Built-in mission categories, in display order.
pub fn seed_categories() -> Vec<MissionCategory> {
  vec![
    MissionCategory {
      id: "cat1".into(),
      name: "Describing People".into(),
      missions: vec![Mission {
        id: "m101".into(),
        title: "Identify the Asset".into(),
        objective: "Learn and use adjectives to describe a person's appearance and personality."
          .into(),
        briefing: "Agent, a key asset is hiding in plain sight. We have intercepted \
                   communications describing them. This mission is divided into three stages: \
                   learning descriptive adjectives, matching profiles to descriptions, and \
                   finally, writing your own detailed report on a new asset. Complete all \
                   stages to succeed."
          .into(),
        stages: vec![
          Stage::Learning {
            id: "s1".into(),
            title: "Stage 1: Dossier Review - Adjectives".into(),
            content: vec![
              ContentBlock {
                title: "Appearance Adjectives".into(),
                text: "These words describe what someone looks like.\n- **Towering:** Very \
                       tall.\n- **Slender:** Thin in an attractive way.\n- **Stout:** Short \
                       and heavily built.\n- **Elegant:** Graceful and stylish in \
                       appearance.\n- **Disheveled:** Untidy hair, clothing, or appearance."
                  .into(),
              },
              ContentBlock {
                title: "Personality Adjectives".into(),
                text: "These words describe someone's character.\n- **Charismatic:** \
                       Compellingly charming.\n- **Meticulous:** Showing great attention to \
                       detail; very careful and precise.\n- **Reserved:** Slow to reveal \
                       emotion or opinions.\n- **Jovial:** Cheerful and friendly.\n- \
                       **Cynical:** Believing that people are motivated by self-interest."
                  .into(),
              },
            ],
          },
          Stage::Matching {
            id: "s2".into(),
            title: "Stage 2: Target Recognition".into(),
            items: vec![
              MatchingItem {
                id: "m-i1".into(),
                image_prompt: "A tall, thin man with neat, stylish clothing and a confident \
                               smile."
                  .into(),
                description: "The elegant man greeted everyone with a charismatic smile.".into(),
              },
              MatchingItem {
                id: "m-i2".into(),
                image_prompt: "A short, cheerful-looking woman with laugh lines around her \
                               eyes, wearing a brightly colored sweater."
                  .into(),
                description: "The jovial woman was known for her kindness.".into(),
              },
              MatchingItem {
                id: "m-i3".into(),
                image_prompt: "A person sitting alone at a cafe, with messy hair and wrinkled \
                               clothes, looking thoughtfully out the window."
                  .into(),
                description: "The disheveled figure seemed lost in thought.".into(),
              },
            ],
            options: vec![
              "The elegant man greeted everyone with a charismatic smile.".into(),
              "The jovial woman was known for her kindness.".into(),
              "The disheveled figure seemed lost in thought.".into(),
              "The stout agent was surprisingly agile.".into(),
            ],
          },
          Stage::Writing {
            id: "s3".into(),
            title: "Stage 3: Field Report".into(),
            image_prompt: "A woman with sharp, intelligent eyes, wearing a perfectly tailored \
                           suit. Her desk is organized with extreme precision. She does not \
                           smile often."
              .into(),
            prompt: "Based on the image prompt above, write a detailed description of this new \
                     asset. Use at least two appearance adjectives and two personality \
                     adjectives from your dossier in Stage 1."
              .into(),
          },
        ],
        points: 100,
        status: MissionStatus::Pending,
      }],
    },
    MissionCategory {
      id: "cat2".into(),
      name: "Daily Activities".into(),
      missions: vec![Mission {
        id: "m201".into(),
        title: "A Day in the Life".into(),
        objective: "Practice using the simple present tense to describe daily routines.".into(),
        briefing: "We need to understand the daily routine of a person of interest. Your \
                   mission is to document your own daily routine, from waking up to going to \
                   bed, using the simple present tense. This will serve as a baseline for our \
                   behavioral analysis algorithms."
          .into(),
        stages: vec![Stage::Writing {
          id: "s1".into(),
          title: "Routine Analysis".into(),
          image_prompt: "An image of a calendar or a clock.".into(),
          prompt: "List at least 10 activities you do every day, writing a full sentence for \
                   each using the simple present tense (e.g., \"I wake up at 7 AM.\"). \
                   Organize your sentences in chronological order."
            .into(),
        }],
        points: 120,
        status: MissionStatus::Pending,
      }],
    },
    MissionCategory {
      id: "cat3".into(),
      name: "Directions".into(),
      missions: vec![Mission {
        id: "m301".into(),
        title: "The Safe House".into(),
        objective: "Practice giving and understanding directions using prepositions of place."
          .into(),
        briefing: "An agent needs to reach a safe house, but their GPS is down. You must \
                   provide clear, turn-by-turn directions. Use a fictional map (you can \
                   imagine one) and guide them from a starting point to a destination. Use \
                   terms like \"turn left,\" \"go straight,\" \"next to,\" and \"across from.\""
          .into(),
        stages: vec![Stage::Writing {
          id: "s1".into(),
          title: "Directional Protocol".into(),
          image_prompt: "A stylized map with various landmarks like a library, a park, and a \
                         clock tower."
            .into(),
          prompt: "Imagine a starting point (e.g., \"the library\") and a destination (e.g., \
                   \"the old clock tower\"). Write at least 5 steps to get from the start to \
                   the destination. Use at least 4 different prepositions or directional \
                   phrases."
            .into(),
        }],
        points: 150,
        status: MissionStatus::Pending,
      }],
    },
  ]
}

/// Built-in leaderboard, already sorted by descending score.
pub fn seed_leaderboard() -> Vec<Agent> {
  vec![
    Agent { id: "a1".into(), codename: "Shadow".into(), score: 2580, rank: 1 },
    Agent { id: "a2".into(), codename: "Viper".into(), score: 2450, rank: 2 },
    Agent { id: "a3".into(), codename: "Ghost".into(), score: 2210, rank: 3 },
    Agent { id: "a4".into(), codename: "Phoenix".into(), score: 1980, rank: 4 },
    Agent { id: "a5".into(), codename: "Rogue".into(), score: 1750, rank: 5 },
  ]
}

/// Catalog sanity check: a matching item whose correct description is missing
/// from the options pool can never be answered right. Returns one human
/// readable line per violation so the caller can log them.
pub fn catalog_issues(categories: &[MissionCategory]) -> Vec<String> {
  let mut issues = Vec::new();
  for cat in categories {
    for mission in &cat.missions {
      for stage in &mission.stages {
        if let Stage::Matching { id, items, options, .. } = stage {
          for item in items {
            if !options.contains(&item.description) {
              issues.push(format!(
                "mission {} stage {} item {}: correct description not in options pool",
                mission.id, id, item.id
              ));
            }
          }
        }
      }
    }
  }
  issues
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seed_catalog_is_well_formed() {
    let cats = seed_categories();
    assert_eq!(cats.len(), 3);
    assert!(catalog_issues(&cats).is_empty());
    for cat in &cats {
      for m in &cat.missions {
        assert!(!m.stages.is_empty(), "mission {} has no stages", m.id);
        assert_eq!(m.status, MissionStatus::Pending);
      }
    }
  }

  #[test]
  fn seed_leaderboard_is_sorted_and_ranked() {
    let agents = seed_leaderboard();
    for pair in agents.windows(2) {
      assert!(pair[0].score >= pair[1].score);
    }
    for (i, a) in agents.iter().enumerate() {
      assert_eq!(a.rank as usize, i + 1);
    }
  }

  #[test]
  fn issues_reported_for_missing_option() {
    let mut cats = seed_categories();
    if let Stage::Matching { options, .. } = &mut cats[0].missions[0].stages[1] {
      options.retain(|o| !o.contains("jovial"));
    }
    let issues = catalog_issues(&cats);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].contains("m-i2"));
  }
}
