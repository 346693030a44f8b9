//! Rule-based messaging taxonomy for ad creatives.
//!
//! Tags each creative with an angle (best score over the pattern table),
//! a hook style (first match on the opening sentence) and an offer type
//! (first match over the full text). Every label is explainable by the
//! rules in [`taxonomy`].

pub mod classifier;
pub mod taxonomy;

pub use classifier::{
    angle_scores, classify_angle, classify_hook, classify_offer, classify_record, classify_text,
    days_active, first_sentence, Classification,
};
