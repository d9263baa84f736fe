//! Fixed scoring instructions shared by every request.

/// System-role instruction: scoring rubric plus the output-format contract.
pub const SYSTEM_RUBRIC: &str = "You are an expert analyst of e-commerce product reviews. \
For each review, estimate how likely it is to be fake, paid, incentivized or otherwise \
inauthentic, as an integer score from 0 to 100 where higher means more likely fabricated. \
Weigh generic or promotional wording, mismatch between rating and text, missing product \
detail, and reviewer signals (unverified purchases are weaker evidence of genuine use). \
Respond with nothing but a JSON array of objects of the form {\"id\":\"<review id>\",\"score\":<integer>}, \
one object per review, with no prose and no markdown.";

/// Scoring bands shown at the top of every user prompt.
pub const SCORING_BANDS: &str = "Scores: 0-20 genuine | 21-40 probably genuine | \
41-60 uncertain | 61-80 probably fake | 81-100 fake";

/// Legend for the compact per-review field keys.
pub const FIELD_LEGEND: &str = "Keys: id=review id, r=stars 1-5, \
f=flags (V=verified purchase, VV=Vine reviewer, -=none), t=title, b=body";

/// Sampling temperature; zero keeps repeated runs on identical input stable.
pub const SCORING_TEMPERATURE: f32 = 0.0;

/// Nucleus sampling bound used with [`SCORING_TEMPERATURE`].
pub const SCORING_TOP_P: f32 = 0.1;
