// Wrapped-text fixtures with known merge results

/// English prose hard-wrapped at 36 columns with two paragraphs
pub const WRAPPED_PROSE: &str = "It was a bright cold day in April, a\n\
nd the clocks were striking thirteen\n\
. Winston Smith, his chin nuzzled in\n\
to his breast in an effort to escape\n\
the vile wind.\n\
\n\
The hallway smelt of boiled cabbage\n\
and old rag mats. At one end of it a\n\
coloured poster had been tacked up.\n";

/// Expected output for WRAPPED_PROSE with default options
pub const WRAPPED_PROSE_EXPECTED: &str = "It was a bright cold day in April, and the clocks were striking thirteen. Winston Smith, his chin nuzzled into his breast in an effort to escapethe vile wind.\n\
The hallway smelt of boiled cabbageand old rag mats. At one end of it acoloured poster had been tacked up.";

/// Chinese text wrapped at 16 characters, full-width punctuation
pub const WRAPPED_CJK: &str = "天色渐渐暗了下来，街上的行人越来\n\
越少了只剩下几盏昏黄的路灯还亮着\n\
照着空荡荡的石板路。\n\
他停下脚步。\n";

pub const WRAPPED_CJK_EXPECTED: &str = "天色渐渐暗了下来，街上的行人越来越少了只剩下几盏昏黄的路灯还亮着照着空荡荡的石板路。\n\
他停下脚步。";

/// Ragged text where no length band holds half the lines
pub const RAGGED_TEXT: &str = "Title\n\
A line of middling length here\n\
short\n\
Something else entirely, and much longer than the rest of them\n\
tiny bit\n";
