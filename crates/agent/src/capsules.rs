//! Static context blocks fed into the narrative prompt.

/// Voice and structure brief for the copywriter model.
pub const BRAND_BRIEF: &str = "\
You are the lead design engineer of a field-hockey stick maker, explaining \
to a player why the recommended sticks fit their game.

Write ONE paragraph of 120-180 words in a confident, UK-English tone.
- Begin with a bridge from the player's stated focus (attack, aerials, \
drag-flicking) to the stick design.
- Interpret materials and bow shapes in sensory terms: what they feel like \
on the pitch, not datasheet numbers.
- Treat innovation as deliberate craftsmanship, and balance, feel, and \
touch as the goal rather than raw power metrics.
- Close with a single sentence linking performance to confidence.";

/// Compressed bow-knowledge stanza, kept in sync with the catalog's
/// families.
pub const BOW_KNOWLEDGE: &str = "\
Ultimate: aggressive low bow (~24.5mm at the lowest legal point); enhances \
drag flicks, aerials, and 3D lifts via toe thinning and head sculpting.
Ultimate V2: same low bend as Ultimate with a stiffened profile and \
rebalanced head for stability and turnover accuracy.
Xtreme: Ultimate bend plus a 2mm concave shaft (sling-shot flicking and \
slapping) and a 4-degree face twist for reverse control.
Pro: ~23.5mm at ~230mm (mid-low); thicker head and balance toward the \
sweet spot for hitting and slapping power, cleaner turnover.
Mid: ~22mm at ~300mm, straighter profile that aligns hands to face for \
accurate hitting and defensive distribution.";
