// 监考端连接ID
pub type ConnId = u32;
// 学生提交时使用的昵称
pub type Pseudo = String;
