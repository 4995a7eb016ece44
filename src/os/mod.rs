use std::ffi::CStr;
use std::os::raw::c_char;

pub fn ifname(index: u32) -> Option<String> {
    let mut buf = [0 as c_char; libc::IF_NAMESIZE];
    unsafe {
        let name = libc::if_indextoname(index, buf.as_mut_ptr());
        match name.is_null() {
            true  => None,
            false => Some(CStr::from_ptr(name).to_string_lossy().into_owned()),
        }
    }
}
