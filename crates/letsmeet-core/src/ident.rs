//! Human-readable public identifiers for events.
//!
//! An event's internal id is turned into a `PascalCase` phrase such as
//! `GraciousSnarlingHorse`: `word_count - 1` adjectives followed by an
//! animal. The transform is keyed by a seed and is a pure function of
//! `(internal_id, word_count)`, so the same event always maps to the same
//! phrase for a given length. Phrases are not unique; callers resolve
//! collisions by asking for a longer phrase.

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x4c45_5453_4d45_4554;

/// Longest phrase the service will ask for, retries included.
pub const MAX_WORD_COUNT: u32 = 16;

const ADJECTIVES: [&str; 64] = [
    "Agile", "Amber", "Ancient", "Brave", "Bright", "Brisk", "Calm", "Clever", "Cosmic", "Crimson",
    "Curious", "Dapper", "Daring", "Dusty", "Eager", "Electric", "Fancy", "Fearless", "Fluffy",
    "Frosty", "Gentle", "Giant", "Gleaming", "Golden", "Gracious", "Happy", "Hidden", "Humble",
    "Icy", "Jolly", "Kind", "Lively", "Lucky", "Mellow", "Mighty", "Misty", "Noble", "Nimble",
    "Patient", "Playful", "Polite", "Proud", "Quiet", "Quirky", "Rapid", "Rustic", "Shiny",
    "Silent", "Silver", "Sleepy", "Snarling", "Sneaky", "Spry", "Steady", "Stormy", "Sunny",
    "Swift", "Tidy", "Velvet", "Vivid", "Wandering", "Witty", "Zany", "Zesty",
];

const ANIMALS: [&str; 64] = [
    "Alpaca", "Badger", "Bat", "Bear", "Beaver", "Bison", "Camel", "Cat", "Cobra", "Crane",
    "Crow", "Deer", "Dingo", "Dolphin", "Donkey", "Eagle", "Falcon", "Ferret", "Finch", "Fox",
    "Frog", "Gazelle", "Gecko", "Goat", "Goose", "Gopher", "Hare", "Hawk", "Heron", "Horse",
    "Ibis", "Jackal", "Koala", "Lemur", "Lion", "Llama", "Lynx", "Marmot", "Mole", "Moose",
    "Newt", "Otter", "Owl", "Panda", "Parrot", "Pelican", "Penguin", "Puffin", "Quail", "Rabbit",
    "Raven", "Salmon", "Seal", "Shark", "Sloth", "Sparrow", "Squid", "Tiger", "Toad", "Turtle",
    "Walrus", "Whale", "Wombat", "Yak",
];

/// Derives public identifiers from internal event ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierGenerator {
    seed: u64,
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl IdentifierGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generate the identifier for `internal_id` with `word_count` words.
    ///
    /// A `word_count` of zero is treated as one (a bare animal name).
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn generate(&self, internal_id: i64, word_count: u32) -> String {
        let word_count = word_count.max(1);
        let mut state =
            self.seed ^ mix(internal_id as u64) ^ mix(u64::from(word_count).rotate_right(8));

        let mut out = String::with_capacity(word_count.min(MAX_WORD_COUNT) as usize * 8);
        for position in 0..word_count {
            state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
            let pick = mix(state) as usize;
            let word = if position + 1 == word_count {
                ANIMALS[pick % ANIMALS.len()]
            } else {
                ADJECTIVES[pick % ADJECTIVES.len()]
            };
            out.push_str(word);
        }
        out
    }
}

/// `SplitMix64` finalizer.
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
