use std::collections::HashSet;

use rand::Rng;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated record ids.
pub const ID_LEN: usize = 6;

/// Generate a short lowercase base-36 id that is not among `existing`.
pub fn generate_id<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = existing.into_iter().collect();
    let mut rng = rand::thread_rng();
    loop {
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}
