mod host;
mod session;
mod storage;
