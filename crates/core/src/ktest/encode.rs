use super::{KTest, KTEST_MAGIC};

impl KTest {
    /// Serialize the record in the current (`KTEST`) layout.
    ///
    /// This is the exact inverse of [`KTest::decode`]: decoding the output
    /// yields the same version, arguments, symbolic argv fields and objects.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(KTEST_MAGIC);
        put_i32(&mut out, self.version);
        put_i32(&mut out, self.args.len() as i32);
        for arg in &self.args {
            put_blob(&mut out, arg.as_bytes());
        }
        if self.version >= 2 {
            put_i32(&mut out, self.sym_argvs);
            put_i32(&mut out, self.sym_argv_len);
        }
        put_i32(&mut out, self.objects.len() as i32);
        for object in &self.objects {
            put_blob(&mut out, object.name.as_bytes());
            put_blob(&mut out, &object.bytes);
        }
        out
    }
}

fn put_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_blob(out: &mut Vec<u8>, bytes: &[u8]) {
    put_i32(out, bytes.len() as i32);
    out.extend_from_slice(bytes);
}
