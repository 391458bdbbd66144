#![no_main]

use dynbuf_buffer::{Buffer, buffer_fmt};
use dynbuf_error::DynbufError;
use dynbuf_fuzz::{Action, FuzzBufferAction};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|fuzz_action: FuzzBufferAction| {
    let FuzzBufferAction {
        initial_capacity,
        actions,
    } = fuzz_action;

    let mut buf = Buffer::with_capacity(initial_capacity).unwrap();
    let mut model: Vec<u8> = Vec::new();

    for (i, action) in actions.into_iter().enumerate() {
        match action {
            Action::Insert(offset, data) => match buf.insert(offset, &data) {
                Ok(()) if data.is_empty() => {}
                Ok(()) => {
                    model.splice(offset..offset, data);
                }
                Err(DynbufError::OutOfBounds(..)) => assert!(offset > model.len()),
                Err(e) => panic!("insert failed in step {i}: {e}"),
            },
            Action::Append(data) => {
                buf.append(&data).unwrap();
                model.extend_from_slice(&data);
            }
            Action::Skip(n) => {
                buf.skip(n);
                model.drain(..n.min(model.len()));
            }
            Action::RemoveBefore(offset, n) => {
                let offset = offset.min(model.len());
                let n = n.min(offset);
                assert_eq!(buf.remove_before(offset, n), n);
                model.drain(offset - n..offset);
            }
            Action::RemoveAfter(offset, n) => {
                let offset = offset.min(model.len());
                let n = n.min(model.len() - offset);
                assert_eq!(buf.remove_after(offset, n), n);
                model.drain(offset..offset + n);
            }
            Action::Truncate(len) => {
                buf.truncate(len);
                model.truncate(len);
            }
            Action::Reserve(size, fill) => {
                let tail = buf.reserve(size).unwrap();
                assert!(tail.len() >= size);
                tail[..fill].fill(0xAA);
                buf.increase_length(fill).unwrap();
                model.extend(std::iter::repeat_n(0xAA, fill));
            }
            Action::Format(value) => {
                let written = buffer_fmt!(buf, "[{}]", value).unwrap();
                let text = format!("[{value}]");
                assert_eq!(written, text.len());
                model.extend_from_slice(text.as_bytes());
            }
            Action::Extract => match buf.extract() {
                Ok(bytes) => {
                    assert_eq!(bytes.as_ref(), model.as_slice());
                    assert_eq!(buf.capacity(), 0);
                    model.clear();
                }
                Err(DynbufError::EmptyBuffer(..)) => assert!(model.is_empty()),
                Err(e) => panic!("extract failed in step {i}: {e}"),
            },
            Action::Duplicate => match buf.duplicate() {
                Ok(bytes) => assert_eq!(bytes.as_ref(), model.as_slice()),
                Err(DynbufError::EmptyBuffer(..)) => assert!(model.is_empty()),
                Err(e) => panic!("duplicate failed in step {i}: {e}"),
            },
            Action::Clear => {
                buf.clear();
                model.clear();
            }
            Action::Reset => {
                buf.reset();
                model.clear();
            }
        }

        assert_eq!(buf.as_slice(), model.as_slice(), "diverged in step {i}");
        assert!(buf.skipped() + buf.len() <= buf.capacity());
        assert!(!buf.is_empty() || buf.skipped() == 0);
    }
});
