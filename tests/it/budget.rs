use std::io::{BufReader, Read, Seek, SeekFrom, Write};

use pagecodec::read::{read_page_header, BudgetedReader};
use pagecodec::write::page::write_dictionary_page;

#[test]
fn test_counts_reads_through_buffering() {
    let mut file = tempfile::tempfile().unwrap();
    let data = (0..100u8).collect::<Vec<_>>();
    file.write_all(&data).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    // the buffered reader pulls far more than 10 bytes from the file
    let mut reader = BudgetedReader::new(BufReader::with_capacity(64, file));
    let mut header = [0u8; 10];
    reader.read_exact(&mut header).unwrap();
    assert_eq!(reader.bytes_consumed(), 10);
    reader.ensure_consumed(10).unwrap();
    assert!(reader.ensure_consumed(11).is_err());
}

#[test]
fn test_seeks_count_distance() {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&[7u8; 50]).unwrap();
    file.seek(SeekFrom::Start(20)).unwrap();

    let mut reader = BudgetedReader::new(file);
    reader.seek(SeekFrom::Current(10)).unwrap();
    assert_eq!(reader.bytes_consumed(), 10);
    reader.seek(SeekFrom::Start(25)).unwrap();
    assert_eq!(reader.bytes_consumed(), 15);
    let mut byte = [0u8];
    reader.read_exact(&mut byte).unwrap();
    assert_eq!(reader.bytes_consumed(), 16);
}

#[test]
fn test_page_header_from_file() {
    let mut file = tempfile::tempfile().unwrap();
    let meta = write_dictionary_page(&mut file, &[1i64, 2, 3]).unwrap();
    file.write_all(b"trailing").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut reader = BufReader::new(file);
    let (header, header_size) = read_page_header(&mut reader, 1024).unwrap();
    assert_eq!(header_size + header.compressed_page_size as u64, meta.length);

    // the reader is left on the first byte of the body
    let mut body = vec![0u8; header.compressed_page_size as usize];
    reader.read_exact(&mut body).unwrap();
    assert_eq!(&body[..8], &1i64.to_le_bytes());
}
