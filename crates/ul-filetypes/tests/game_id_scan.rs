use ul_filetypes::{game_id_from_bytes, UNKNOWN_GAME_ID};

fn image_with_boot_line(tail: &[u8]) -> Vec<u8> {
    let mut image = vec![0u8; 512];
    image.extend_from_slice(b"BOOT2 = cdrom0:\\");
    image.extend_from_slice(tail);
    image
}

#[test]
fn reads_the_identifier_up_to_a_semicolon() {
    let image = image_with_boot_line(b"SLUS_203.09;1\r\n");
    assert_eq!(game_id_from_bytes(&image), "SLUS_203.09");
}

#[test]
fn nul_backslash_and_space_also_terminate() {
    for terminator in [&b"\0"[..], b"\\rest", b" VER=1"] {
        let mut tail = b"SCES_500.04".to_vec();
        tail.extend_from_slice(terminator);
        let image = image_with_boot_line(&tail);
        assert_eq!(game_id_from_bytes(&image), "SCES_500.04");
    }
}

#[test]
fn missing_marker_yields_the_sentinel() {
    let image = vec![0x42u8; 4096];
    assert_eq!(game_id_from_bytes(&image), UNKNOWN_GAME_ID);
}

#[test]
fn window_ending_mid_identifier_yields_the_accumulated_prefix() {
    let mut image = vec![0u8; 128];
    image.extend_from_slice(b"cdrom0:\\SLPS_25");
    assert_eq!(game_id_from_bytes(&image), "SLPS_25");
}

#[test]
fn marker_at_the_very_end_of_the_window_yields_an_empty_identifier() {
    let mut image = vec![0u8; 128];
    image.extend_from_slice(b"cdrom0:\\");
    assert_eq!(game_id_from_bytes(&image), "");
}

#[test]
fn undecodable_bytes_are_dropped() {
    let image = image_with_boot_line(&[0xFF, b'A', b'B', b';']);
    assert_eq!(game_id_from_bytes(&image), "AB");
}
