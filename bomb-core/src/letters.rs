use rand::Rng;

/// Digraphs a turn prompt is drawn from, weighted equally. These are common
/// English letter pairs so every prompt has plenty of answers.
pub const LETTER_COMBINATIONS: [&str; 60] = [
    "AS", "ER", "TH", "ON", "IN", "RE", "AN", "ED", "ND", "TO", //
    "OR", "EA", "TI", "AR", "TE", "NG", "AL", "IT", "IS", "EN", //
    "AT", "IO", "LE", "CO", "RA", "RO", "LI", "HE", "RI", "NE", //
    "ST", "OU", "ES", "LA", "VE", "PO", "DE", "MA", "CA", "SE", //
    "EL", "UN", "CE", "ME", "UR", "PA", "TA", "GH", "BL", "CH", //
    "SH", "TR", "PR", "BR", "CR", "DR", "FR", "GR", "SP", "PL",
];

/// Room code alphabet. Excludes I, O, 0 and 1, which read ambiguously when
/// shared out loud or handwritten.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const ROOM_CODE_LENGTH: usize = 6;

/// Draw the two-letter prompt for the next turn.
pub fn random_letters() -> String {
    let mut rng = rand::rng();
    LETTER_COMBINATIONS[rng.random_range(0..LETTER_COMBINATIONS.len())].to_string()
}

/// Generate a shareable room code. Uniqueness among open lobbies is the
/// caller's concern.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_shape() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), ROOM_CODE_LENGTH);
            assert!(
                code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)),
                "unexpected character in room code {}",
                code
            );
        }
    }

    #[test]
    fn test_room_code_excludes_ambiguous_glyphs() {
        for banned in ['I', 'O', '0', '1'] {
            assert!(!ROOM_CODE_ALPHABET.contains(&(banned as u8)));
        }
    }

    #[test]
    fn test_random_letters_come_from_the_table() {
        for _ in 0..100 {
            let letters = random_letters();
            assert!(LETTER_COMBINATIONS.contains(&letters.as_str()));
        }
    }

    #[test]
    fn test_combination_table_is_all_two_letter_uppercase() {
        for combo in LETTER_COMBINATIONS {
            assert_eq!(combo.len(), 2);
            assert!(combo.chars().all(|c| c.is_ascii_uppercase()));
        }
    }
}
