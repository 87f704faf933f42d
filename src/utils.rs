/// Renders `start..=end` as a hexdump, 16 bytes per line, fetching each byte
/// through `read`.
pub fn hexdump(mut read: impl FnMut(u32) -> u8, start: u32, end: u32) -> String {
    let mut str = String::new();
    let mut addr = start;
    let mut done = start > end;
    while !done {
        let mut line = format!("{:05x}: ", addr);
        let mut chars = String::new();
        for _ in 0..16 {
            if done {
                break;
            }
            let byte = read(addr);
            line.push_str(&format!("{:02x} ", byte));
            let c = byte as char;
            chars.push(if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                '.'
            });

            done = addr == end;
            addr = addr.wrapping_add(1);
        }

        let dump_line = format!("{:<55} {}\n", line, chars);
        str.push_str(&dump_line);
    }

    str
}
