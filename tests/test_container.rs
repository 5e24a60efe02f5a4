use riders_lzss::{
    build_header, deserialize, encode, pack, serialize, unpack, Command, Endianness, FormatError,
    Header, HeaderLayout, LzEntry, PlatformMap, PlatformMapError, UnpackError,
};

const LAYOUTS: [HeaderLayout; 2] = [HeaderLayout::GAMECUBE, HeaderLayout::PC];

fn with_header(plain_size: u32, layout: HeaderLayout, commands: &[Command]) -> Vec<u8> {
    let mut data = build_header(plain_size, layout);
    data.extend(serialize(commands));
    data
}

fn sample_commands() -> Vec<Command> {
    vec![
        Command::Raw(0x41),
        Command::Lz(LzEntry {
            distance: 1,
            length: 4,
        }),
    ]
}

#[test]
fn test_serialize_bit_layout() {
    // 0 01000001 | 1 00000001 00000100 | zero padding
    assert_eq!(serialize(&sample_commands()), vec![0x20, 0xc0, 0x41, 0x00]);
}

#[test]
fn test_serialize_byte_aligned_stream() {
    // eight raw commands take exactly nine bytes
    let commands = vec![Command::Raw(0xff); 8];
    assert_eq!(
        serialize(&commands),
        vec![0x7f, 0xbf, 0xdf, 0xef, 0xf7, 0xfb, 0xfd, 0xfe, 0xff]
    );
}

#[test]
fn test_header_gamecube() {
    let header = build_header(5, HeaderLayout::GAMECUBE);

    assert_eq!(header.len(), 0x20);
    assert_eq!(&header[..8], &[0x80, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x05]);
    assert!(header[8..].iter().all(|&byte| byte == 0));
}

#[test]
fn test_header_pc() {
    let header = build_header(0x0102_0304, HeaderLayout::PC);

    assert_eq!(header.len(), 0x80);
    assert_eq!(&header[..8], &[0x01, 0x00, 0x00, 0x80, 0x04, 0x03, 0x02, 0x01]);
    assert!(header[8..].iter().all(|&byte| byte == 0));
}

#[test]
fn test_layout_from_flag() {
    assert_eq!(HeaderLayout::from_flag(true), HeaderLayout::GAMECUBE);
    assert_eq!(HeaderLayout::from_flag(false), HeaderLayout::PC);
    assert_eq!(HeaderLayout::GAMECUBE.endianness(), Endianness::Big);
    assert_eq!(HeaderLayout::PC.data_offset(), 0x80);
    assert_eq!(HeaderLayout::new(Endianness::Big, 4), None);
}

#[test]
fn test_deserialize_round_trip() -> anyhow::Result<()> {
    let plain = b"the quick brown fox jumps over the quick brown dog, again and again and again";
    let commands = encode(plain);

    for layout in LAYOUTS {
        let data = with_header(plain.len() as u32, layout, &commands);
        assert_eq!(deserialize(&data, layout)?, commands);
    }

    Ok(())
}

#[test]
fn test_deserialize_keeps_overshooting_command() -> anyhow::Result<()> {
    // plain size 3 ends inside the back-reference, which is still kept whole
    let data = with_header(3, HeaderLayout::GAMECUBE, &sample_commands());
    assert_eq!(deserialize(&data, HeaderLayout::GAMECUBE)?, sample_commands());

    Ok(())
}

#[test]
fn test_deserialize_stops_at_plain_size() -> anyhow::Result<()> {
    let mut commands = sample_commands();
    commands.push(Command::Raw(0x42));

    let data = with_header(5, HeaderLayout::PC, &commands);
    assert_eq!(deserialize(&data, HeaderLayout::PC)?, sample_commands());

    Ok(())
}

#[test]
fn test_zero_plain_size_rejected() {
    for layout in LAYOUTS {
        let data = with_header(0, layout, &sample_commands());
        assert_eq!(deserialize(&data, layout), Err(FormatError::ZeroPlainSize));
    }
}

#[test]
fn test_bad_signature_rejected() {
    let mut data = with_header(5, HeaderLayout::GAMECUBE, &sample_commands());
    data[3] = 0x02;
    assert_eq!(
        deserialize(&data, HeaderLayout::GAMECUBE),
        Err(FormatError::BadSignature(0x8000_0002))
    );
}

#[test]
fn test_wrong_layout_rejected() {
    // big-endian signature read as little-endian
    let data = with_header(5, HeaderLayout::GAMECUBE, &sample_commands());
    assert_eq!(
        deserialize(&data, HeaderLayout::PC),
        Err(FormatError::BadSignature(0x0100_0080))
    );
}

#[test]
fn test_truncated_header_rejected() {
    assert_eq!(
        deserialize(&[0x80, 0x00], HeaderLayout::GAMECUBE),
        Err(FormatError::TruncatedHeader {
            len: 2,
            required: 8
        })
    );

    let header = build_header(5, HeaderLayout::GAMECUBE);
    assert_eq!(
        deserialize(&header[..0x10], HeaderLayout::GAMECUBE),
        Err(FormatError::TruncatedHeader {
            len: 0x10,
            required: 0x20
        })
    );
}

#[test]
fn test_truncated_stream_rejected() {
    // padding bits start a raw command that never finishes
    let data = with_header(10, HeaderLayout::GAMECUBE, &sample_commands());
    assert_eq!(
        deserialize(&data, HeaderLayout::GAMECUBE),
        Err(FormatError::Truncated {
            bit_offset: 27,
            decoded: 5,
            plain_size: 10
        })
    );
}

#[test]
fn test_pack_unpack() -> anyhow::Result<()> {
    let plain = (0..4096u32)
        .map(|i| ((i / 3) % 40) as u8 ^ (i % 5) as u8)
        .collect::<Vec<_>>();

    for layout in LAYOUTS {
        let packed = pack(&plain, layout)?;

        assert_eq!(Header::read(&packed, layout)?.plain_size, plain.len() as u32);
        assert!(packed.len() < plain.len());
        assert_eq!(unpack(&packed, layout)?, plain);
    }

    Ok(())
}

#[test]
fn test_unpack_rejects_bad_back_reference() {
    let commands = [
        Command::Raw(1),
        Command::Lz(LzEntry {
            distance: 9,
            length: 2,
        }),
    ];
    let data = with_header(3, HeaderLayout::PC, &commands);

    assert!(matches!(
        unpack(&data, HeaderLayout::PC),
        Err(UnpackError::Decompress(_))
    ));
}

#[test]
fn test_inbuilt_platforms() {
    let map = PlatformMap::inbuilt();

    assert_eq!(map.get("pc").map(|p| p.layout()), Some(HeaderLayout::PC));
    assert_eq!(map.get("Xbox").map(|p| p.layout()), Some(HeaderLayout::PC));
    assert_eq!(
        map.get("GAMECUBE").map(|p| p.layout()),
        Some(HeaderLayout::GAMECUBE)
    );
    assert!(map.get("dreamcast").is_none());
}

#[test]
fn test_custom_platform_map() -> anyhow::Result<()> {
    let custom = PlatformMap::parse(
        r#"
        [[platform]]
        name = "ps2"
        endianness = "LE"
        data_offset = 0x40

        [[platform]]
        name = "gamecube"
        description = "overrides the inbuilt definition"
        endianness = "be"
        data_offset = 0x100
        "#,
    )?;
    let additional = [custom];

    let ps2 = PlatformMap::find_platform("ps2", &additional).map(|p| p.layout());
    assert_eq!(ps2, HeaderLayout::new(Endianness::Little, 0x40));

    let gamecube = PlatformMap::find_platform("gamecube", &additional).map(|p| p.layout());
    assert_eq!(gamecube, HeaderLayout::new(Endianness::Big, 0x100));

    let pc = PlatformMap::find_platform("pc", &additional).map(|p| p.layout());
    assert_eq!(pc, Some(HeaderLayout::PC));

    Ok(())
}

#[test]
fn test_invalid_platform_maps() {
    let small_offset = PlatformMap::parse(
        r#"
        [[platform]]
        name = "tiny"
        endianness = "big"
        data_offset = 4
        "#,
    );
    assert!(matches!(
        small_offset,
        Err(PlatformMapError::InvalidDataOffset { data_offset: 4, .. })
    ));

    let duplicate = PlatformMap::parse(
        r#"
        [[platform]]
        name = "pc"
        endianness = "little"
        data_offset = 0x80

        [[platform]]
        name = "PC"
        endianness = "little"
        data_offset = 0x80
        "#,
    );
    assert!(matches!(duplicate, Err(PlatformMapError::Duplicate(_))));

    let bad_endianness = PlatformMap::parse(
        r#"
        [[platform]]
        name = "pc"
        endianness = "middle"
        data_offset = 0x80
        "#,
    );
    assert!(matches!(bad_endianness, Err(PlatformMapError::Parse(_))));
}
